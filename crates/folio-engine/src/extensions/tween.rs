// extensions/tween.rs
//
// Eased movement of one entity along one axis, keyed by EntityId. Used for the area
// slide (x, once, with a completion tag) and the content-box bounce (y, yoyo).
//
//   ctx.tweens.add(id, Tween::along(Axis::X, 240.0, 30.0, 0.3, Easing::QuadInOut).with_done_tag(1));
//   ctx.tweens.tick(dt, &mut ctx.scene);
//   for tag in ctx.tweens.drain_completed() { ... }

use std::collections::BTreeMap;

use crate::api::types::EntityId;
use crate::core::scene::Scene;
use super::easing::{ease, Easing};

/// Which coordinate of `Entity::pos` a tween drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TweenLoop {
    /// Stop at `to`.
    #[default]
    Once,
    /// Go out to `to`, come back, and stop at `from`.
    Yoyo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub axis: Axis,
    pub from: f32,
    pub to: f32,
    /// Seconds for one leg.
    pub duration: f32,
    pub elapsed: f32,
    pub easing: Easing,
    pub loop_mode: TweenLoop,
    /// Reported by `drain_completed` once the tween finishes.
    pub done_tag: Option<u32>,
}

impl Tween {
    pub fn along(axis: Axis, from: f32, to: f32, duration: f32, easing: Easing) -> Self {
        Self {
            axis,
            from,
            to,
            duration,
            elapsed: 0.0,
            easing,
            loop_mode: TweenLoop::Once,
            done_tag: None,
        }
    }

    pub fn with_loop(mut self, mode: TweenLoop) -> Self {
        self.loop_mode = mode;
        self
    }

    pub fn with_done_tag(mut self, tag: u32) -> Self {
        self.done_tag = Some(tag);
        self
    }

    fn total(&self) -> f32 {
        match self.loop_mode {
            TweenLoop::Once => self.duration,
            TweenLoop::Yoyo => self.duration * 2.0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.total()
    }

    /// Current value on the axis.
    pub fn value(&self) -> f32 {
        let leg = if self.duration > 0.0 {
            self.elapsed / self.duration
        } else {
            f32::INFINITY
        };
        let t = match self.loop_mode {
            TweenLoop::Once => leg.min(1.0),
            TweenLoop::Yoyo if leg <= 1.0 => leg,
            TweenLoop::Yoyo => (2.0 - leg).max(0.0),
        };
        ease(self.from, self.to, t, self.easing)
    }
}

/// Running tweens, advanced in the order they were added.
#[derive(Debug, Default)]
pub struct TweenState {
    tweens: BTreeMap<u32, (EntityId, Tween)>,
    next_key: u32,
    done_tags: Vec<u32>,
}

impl TweenState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entity: EntityId, tween: Tween) {
        self.tweens.insert(self.next_key, (entity, tween));
        self.next_key += 1;
    }

    /// Drop an entity's tweens without reporting them as done.
    pub fn remove_entity(&mut self, entity: EntityId) {
        self.tweens.retain(|_, (e, _)| *e != entity);
    }

    pub fn is_tweening(&self, entity: EntityId) -> bool {
        self.tweens.values().any(|(e, _)| *e == entity)
    }

    /// Advance every tween by `dt` and write the values into the scene.
    /// Returns how many finished.
    pub fn tick(&mut self, dt: f32, scene: &mut Scene) -> usize {
        let mut finished = Vec::new();
        for (&key, (entity, tween)) in self.tweens.iter_mut() {
            tween.elapsed += dt;
            let value = tween.value();
            if let Some(entity) = scene.get_mut(*entity) {
                match tween.axis {
                    Axis::X => entity.pos.x = value,
                    Axis::Y => entity.pos.y = value,
                }
            }
            if tween.is_complete() {
                self.done_tags.extend(tween.done_tag);
                finished.push(key);
            }
        }
        for key in &finished {
            self.tweens.remove(key);
        }
        finished.len()
    }

    /// Tags of tweens that finished since the last drain.
    pub fn drain_completed(&mut self) -> impl Iterator<Item = u32> + '_ {
        self.done_tags.drain(..)
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn clear(&mut self) {
        self.tweens.clear();
        self.done_tags.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::entity::Entity;
    use glam::Vec2;

    #[test]
    fn slide_reaches_target_and_reports_tag_once() {
        let mut tweens = TweenState::new();
        let mut scene = Scene::new();
        let id = EntityId(3);
        scene.spawn(Entity::new(id).with_pos(Vec2::new(250.0, 152.0)));

        tweens.add(id, Tween::along(Axis::X, 250.0, 30.0, 0.3, Easing::QuadInOut).with_done_tag(42));
        assert_eq!(tweens.tick(0.15, &mut scene), 0);
        assert!((scene.get(id).unwrap().pos.x - 140.0).abs() < 0.01);
        assert_eq!(tweens.drain_completed().count(), 0);

        assert_eq!(tweens.tick(0.2, &mut scene), 1);
        assert_eq!(scene.get(id).unwrap().pos.x, 30.0);
        assert_eq!(scene.get(id).unwrap().pos.y, 152.0);
        assert_eq!(tweens.drain_completed().collect::<Vec<_>>(), vec![42]);
        assert_eq!(tweens.drain_completed().count(), 0);
        assert!(tweens.is_empty());
    }

    #[test]
    fn yoyo_returns_to_start_then_completes() {
        let mut tweens = TweenState::new();
        let mut scene = Scene::new();
        let id = EntityId(1);
        scene.spawn(Entity::new(id).with_pos(Vec2::new(80.0, 128.0)));

        tweens.add(id, Tween::along(Axis::Y, 128.0, 118.0, 0.1, Easing::QuadOut).with_loop(TweenLoop::Yoyo));
        assert_eq!(tweens.tick(0.1, &mut scene), 0);
        assert!((scene.get(id).unwrap().pos.y - 118.0).abs() < 0.01);

        assert_eq!(tweens.tick(0.1, &mut scene), 1);
        assert!((scene.get(id).unwrap().pos.y - 128.0).abs() < 0.01);
        assert_eq!(tweens.drain_completed().count(), 0);
    }

    #[test]
    fn zero_duration_snaps() {
        let once = Tween::along(Axis::X, 0.0, 10.0, 0.0, Easing::Linear);
        assert!(once.is_complete());
        assert_eq!(once.value(), 10.0);
        let yoyo = once.with_loop(TweenLoop::Yoyo);
        assert_eq!(yoyo.value(), 0.0);
    }

    #[test]
    fn removing_an_entity_keeps_other_tweens() {
        let mut tweens = TweenState::new();
        let id = EntityId(1);
        tweens.add(id, Tween::along(Axis::X, 0.0, 1.0, 1.0, Easing::Linear));
        tweens.add(id, Tween::along(Axis::Y, 0.0, 1.0, 1.0, Easing::Linear));
        tweens.add(EntityId(2), Tween::along(Axis::Y, 0.0, 1.0, 1.0, Easing::Linear));

        tweens.remove_entity(id);
        assert!(!tweens.is_tweening(id));
        assert!(tweens.is_tweening(EntityId(2)));
        assert_eq!(tweens.len(), 1);
    }
}
