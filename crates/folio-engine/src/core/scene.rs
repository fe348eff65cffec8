use crate::api::types::EntityId;
use crate::components::entity::Entity;
use crate::components::layer::RenderLayer;

/// Entities of the running stage, in spawn order. Spawn order is also the draw order
/// within a layer. A stage builds a few dozen at most, so lookups are linear scans.
pub struct Scene {
    entities: Vec<Entity>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            entities: Vec::with_capacity(64),
        }
    }

    pub fn spawn(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    /// Active entities on one layer, in insertion order.
    pub fn iter_layer(&self, layer: RenderLayer) -> impl Iterator<Item = &Entity> {
        self.entities
            .iter()
            .filter(move |e| e.active && e.layer == layer)
    }

    /// Find the first entity with the given tag.
    pub fn find_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.tag == tag)
    }

    /// Find all entities with the given tag.
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<&Entity> {
        self.entities.iter().filter(|e| e.tag == tag).collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
