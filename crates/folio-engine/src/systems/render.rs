use crate::components::entity::Entity;
use crate::components::layer::RenderLayer;
use crate::core::scene::Scene;
use crate::renderer::instance::{RenderBuffer, ShapeInstance, SpriteInstance};

const LAYERS: [RenderLayer; RenderLayer::COUNT] =
    [RenderLayer::Terrain, RenderLayer::Objects, RenderLayer::Actors];

fn sprite_instance(entity: &Entity) -> Option<SpriteInstance> {
    let sprite = entity.sprite.as_ref()?;
    let mirror = if sprite.flip_x { -1.0 } else { 1.0 };
    Some(SpriteInstance {
        x: entity.pos.x,
        y: entity.pos.y,
        w: entity.scale.x * mirror,
        h: entity.scale.y,
        col: sprite.col,
        row: sprite.row,
        span: sprite.cell_span,
        atlas: sprite.atlas.0 as f32,
        r: sprite.tint[0],
        g: sprite.tint[1],
        b: sprite.tint[2],
        alpha: sprite.alpha,
    })
}

fn shape_instance(entity: &Entity) -> Option<ShapeInstance> {
    let shape = entity.shape.as_ref()?;
    let [r, g, b, a] = shape.color;
    Some(ShapeInstance {
        x: entity.pos.x,
        y: entity.pos.y,
        w: entity.scale.x,
        h: entity.scale.y,
        r,
        g,
        b,
        a,
    })
}

/// Build the render buffer from the scene, back layer first.
/// An entity with a sprite draws the sprite; otherwise its shape, if any.
pub fn build_render_buffer(scene: &Scene, background: [f32; 3], buffer: &mut RenderBuffer) {
    buffer.clear();
    buffer.background = background;

    for layer in LAYERS {
        for entity in scene.iter_layer(layer) {
            if let Some(sprite) = sprite_instance(entity) {
                buffer.sprites.push(sprite);
            } else if let Some(shape) = shape_instance(entity) {
                buffer.shapes.push(shape);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntityId;
    use crate::components::shape::ShapeComponent;
    use crate::components::sprite::{AtlasId, SpriteComponent};
    use glam::Vec2;

    #[test]
    fn sprites_win_over_shapes_and_layers_order_output() {
        let mut scene = Scene::new();
        scene.spawn(
            Entity::new(EntityId(1))
                .with_pos(Vec2::new(32.0, 152.0))
                .with_scale(Vec2::splat(16.0))
                .with_sprite(SpriteComponent { flip_x: true, ..SpriteComponent::cell(AtlasId(0), 3.0, 0.0) })
                .with_shape(ShapeComponent::hex(0xff0000))
                .with_layer(RenderLayer::Actors),
        );
        scene.spawn(
            Entity::new(EntityId(2))
                .with_scale(Vec2::new(48.0, 16.0))
                .with_shape(ShapeComponent::hex(0x8b4513))
                .with_layer(RenderLayer::Terrain),
        );
        scene.spawn(
            Entity::new(EntityId(3))
                .with_shape(ShapeComponent::hex(0xffd700))
                .with_layer(RenderLayer::Objects),
        );

        let mut buffer = RenderBuffer::new();
        build_render_buffer(&scene, [0.5, 0.5, 0.5], &mut buffer);

        assert_eq!(buffer.sprite_count(), 1);
        assert_eq!(buffer.sprites[0].w, -16.0);
        assert_eq!(buffer.sprites[0].col, 3.0);
        assert_eq!(buffer.shape_count(), 2);
        assert_eq!(buffer.shapes[0].w, 48.0);
        assert_eq!(buffer.shapes[1].r, 1.0);
        assert_eq!(buffer.background, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn inactive_entities_are_skipped() {
        let mut scene = Scene::new();
        let mut entity = Entity::new(EntityId(1)).with_shape(ShapeComponent::rgb(1.0, 0.0, 0.0));
        entity.active = false;
        scene.spawn(entity);

        let mut buffer = RenderBuffer::new();
        build_render_buffer(&scene, [0.0; 3], &mut buffer);
        assert_eq!(buffer.shape_count(), 0);
    }
}
