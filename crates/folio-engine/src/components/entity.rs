use glam::Vec2;
use crate::api::types::EntityId;
use crate::components::animation::AnimationComponent;
use crate::components::layer::RenderLayer;
use crate::components::shape::ShapeComponent;
use crate::components::sprite::SpriteComponent;

/// Something drawn in the world: a terrain tile, a content box, or the player.
/// Gameplay state lives in the stage; the entity only carries what the renderer needs.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// String tag for finding entities by name.
    pub tag: String,
    /// Inactive entities are not drawn.
    pub active: bool,
    /// Center position in world space (y grows downward).
    pub pos: Vec2,
    /// Rendered size in world units.
    pub scale: Vec2,
    /// Textured sprite. Takes precedence over `shape` when the atlas is usable.
    pub sprite: Option<SpriteComponent>,
    /// Frame animation driving `sprite`.
    pub animation: Option<AnimationComponent>,
    /// Flat-colour rectangle, used for terrain and as the placeholder look.
    pub shape: Option<ShapeComponent>,
    /// Draw order bucket.
    pub layer: RenderLayer,
}

impl Entity {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            tag: String::new(),
            active: true,
            pos: Vec2::ZERO,
            scale: Vec2::ONE,
            sprite: None,
            animation: None,
            shape: None,
            layer: RenderLayer::default(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_pos(mut self, pos: Vec2) -> Self {
        self.pos = pos;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_sprite(mut self, sprite: SpriteComponent) -> Self {
        self.sprite = Some(sprite);
        self
    }

    pub fn with_animation(mut self, animation: AnimationComponent) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn with_shape(mut self, shape: ShapeComponent) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_layer(mut self, layer: RenderLayer) -> Self {
        self.layer = layer;
        self
    }
}
