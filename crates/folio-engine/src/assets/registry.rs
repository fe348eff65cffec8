use std::collections::HashMap;
use crate::assets::manifest::AssetManifest;
use crate::components::sprite::{SpriteComponent, AtlasId};

/// Registry of named sprites, built from an AssetManifest.
/// Provides name-based sprite lookup for stage code.
#[derive(Debug, Clone, Default)]
pub struct SpriteRegistry {
    sprites: HashMap<String, SpriteComponent>,
}

impl SpriteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a parsed AssetManifest.
    /// Sprites pointing at an atlas the manifest does not declare are skipped.
    pub fn from_manifest(manifest: &AssetManifest) -> Self {
        let mut sprites = HashMap::with_capacity(manifest.sprites.len());
        for (name, desc) in &manifest.sprites {
            if desc.atlas as usize >= manifest.atlases.len() {
                log::warn!("Sprite '{}' references unknown atlas {}", name, desc.atlas);
                continue;
            }
            sprites.insert(name.clone(), SpriteComponent {
                atlas: AtlasId(desc.atlas),
                col: desc.col as f32,
                row: desc.row as f32,
                cell_span: desc.span as f32,
                ..Default::default()
            });
        }
        Self { sprites }
    }

    /// Look up a sprite by name. Returns None if not found.
    pub fn get(&self, name: &str) -> Option<&SpriteComponent> {
        self.sprites.get(name)
    }

    /// Atlas cell (col, row) of a named sprite, for animation frame lists.
    pub fn frame(&self, name: &str) -> Option<(f32, f32)> {
        self.get(name).map(|s| (s.col, s.row))
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

/// How entities are drawn, decided when loading ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderScheme {
    /// The preferred atlas texture loaded.
    Atlas,
    /// Only the fallback texture loaded; same cells, different file.
    FallbackAtlas,
    /// No usable atlas: actors draw as flat-colour rectangles.
    #[default]
    Placeholder,
}

impl RenderScheme {
    pub fn uses_sprites(self) -> bool {
        !matches!(self, RenderScheme::Placeholder)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RenderScheme::Atlas => "atlas",
            RenderScheme::FallbackAtlas => "fallback-atlas",
            RenderScheme::Placeholder => "placeholder",
        }
    }
}

/// What the Preload stage hands to gameplay.
#[derive(Debug, Clone, Default)]
pub struct LoadedAssets {
    pub scheme: RenderScheme,
    pub registry: SpriteRegistry,
}

impl LoadedAssets {
    /// Sprite for `name`, only when the scheme can draw sprites.
    pub fn sprite(&self, name: &str) -> Option<SpriteComponent> {
        if !self.scheme.uses_sprites() {
            return None;
        }
        self.registry.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "atlases": [
            { "name": "tiles", "cols": 16, "rows": 8, "path": "tiles.png" }
        ],
        "sprites": {
            "hero": { "atlas": 0, "col": 3, "row": 5, "span": 2 },
            "ghost": { "atlas": 4, "col": 0, "row": 0 }
        }
    }"#;

    #[test]
    fn loads_from_manifest() {
        let manifest = AssetManifest::from_json(JSON).unwrap();
        let reg = SpriteRegistry::from_manifest(&manifest);

        let hero = reg.get("hero").expect("hero should exist");
        assert_eq!(hero.atlas, AtlasId(0));
        assert_eq!(hero.col, 3.0);
        assert_eq!(hero.row, 5.0);
        assert_eq!(hero.cell_span, 2.0);
        assert_eq!(hero.alpha, 1.0);
        assert_eq!(reg.frame("hero"), Some((3.0, 5.0)));
        assert!(reg.get("ghost").is_none());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn placeholder_scheme_hides_sprites() {
        let manifest = AssetManifest::from_json(JSON).unwrap();
        let mut assets = LoadedAssets {
            scheme: RenderScheme::Placeholder,
            registry: SpriteRegistry::from_manifest(&manifest),
        };
        assert!(assets.sprite("hero").is_none());

        assets.scheme = RenderScheme::FallbackAtlas;
        assert!(assets.sprite("hero").is_some());
    }
}
