use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Manifest compiled into the engine. The hosting page may supply its own.
const DEFAULT_MANIFEST: &str = include_str!("../../assets/manifest.json");

/// Asset manifest describing every texture the Preload stage fetches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Grid atlases holding the animated sprites.
    #[serde(default)]
    pub atlases: Vec<AtlasDescriptor>,
    /// Standalone images (e.g. terrain tiles).
    #[serde(default)]
    pub images: Vec<ImageDescriptor>,
    /// Named sprite lookup: name → atlas index + cell coordinates.
    #[serde(default)]
    pub sprites: HashMap<String, SpriteDescriptor>,
}

/// Describes a single texture atlas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtlasDescriptor {
    /// Load key (e.g., "mario-atlas").
    pub name: String,
    /// Number of columns in the atlas grid.
    pub cols: u32,
    /// Number of rows in the atlas grid.
    pub rows: u32,
    /// Preferred texture (usually the SVG).
    pub path: String,
    /// Tried once when `path` fails to load.
    #[serde(default)]
    pub fallback_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub name: String,
    pub path: String,
}

/// Describes a named sprite within an atlas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteDescriptor {
    /// Index into the atlases array.
    pub atlas: u32,
    /// Column in the atlas grid.
    pub col: u32,
    /// Row in the atlas grid.
    pub row: u32,
    /// Number of cells this sprite spans (default: 1).
    #[serde(default = "default_span")]
    pub span: u32,
}

fn default_span() -> u32 {
    1
}

impl AssetManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The manifest shipped with the engine.
    pub fn builtin() -> Self {
        match Self::from_json(DEFAULT_MANIFEST) {
            Ok(manifest) => manifest,
            Err(err) => {
                log::error!("Built-in asset manifest is invalid: {}", err);
                Self::default()
            }
        }
    }

    /// Number of textures the loader waits on (atlases + images).
    pub fn texture_count(&self) -> usize {
        self.atlases.len() + self.images.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_manifest_has_every_gameplay_frame() {
        let manifest = AssetManifest::builtin();
        assert_eq!(manifest.atlases.len(), 1);
        assert_eq!(manifest.texture_count(), 2);
        assert!(manifest.atlases[0].fallback_path.is_some());
        for name in [
            "mario-idle", "mario-walk-1", "mario-walk-2", "mario-jump",
            "box-resume", "box-portfolio", "box-contact",
        ] {
            assert!(manifest.sprites.contains_key(name), "missing {}", name);
        }
    }

    #[test]
    fn parse_minimal_manifest() {
        let json = r#"{
            "atlases": [
                { "name": "tiles", "cols": 16, "rows": 8, "path": "tiles.png" }
            ],
            "sprites": {
                "hero": { "atlas": 0, "col": 0, "row": 0 }
            }
        }"#;
        let manifest = AssetManifest::from_json(json).unwrap();
        assert_eq!(manifest.atlases[0].cols, 16);
        assert_eq!(manifest.atlases[0].fallback_path, None);
        assert!(manifest.images.is_empty());
        assert_eq!(manifest.sprites["hero"].span, 1);
    }

    #[test]
    fn empty_document_is_an_empty_manifest() {
        let manifest = AssetManifest::from_json("{}").unwrap();
        assert_eq!(manifest.texture_count(), 0);
    }
}
