//! Axis-aligned boxes and the kinematic sweep used for the player against static
//! platforms. Y grows downward, matching the screen.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle stored as center + half extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half
    }

    pub fn size(&self) -> Vec2 {
        self.half * 2.0
    }

    /// Strict overlap: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let d = (self.center - other.center).abs();
        let reach = self.half + other.half;
        d.x < reach.x && d.y < reach.y
    }
}

/// Result of moving a body one step against the static geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    /// Landed on top of something this step.
    pub down: bool,
}

/// Move `pos` by `vel * dt`, horizontal axis first, then vertical, pushing out of any
/// solid it ends up inside and zeroing the velocity component that caused the hit.
pub fn move_and_collide(
    pos: &mut Vec2,
    vel: &mut Vec2,
    half: Vec2,
    dt: f32,
    solids: &[Aabb],
) -> Contacts {
    let mut contacts = Contacts::default();

    pos.x += vel.x * dt;
    for solid in solids {
        let body = Aabb { center: *pos, half };
        if !body.overlaps(solid) {
            continue;
        }
        if vel.x > 0.0 {
            pos.x = solid.min().x - half.x;
        } else if vel.x < 0.0 {
            pos.x = solid.max().x + half.x;
        } else {
            continue;
        }
        vel.x = 0.0;
    }

    pos.y += vel.y * dt;
    for solid in solids {
        let body = Aabb { center: *pos, half };
        if !body.overlaps(solid) {
            continue;
        }
        if vel.y >= 0.0 {
            pos.y = solid.min().y - half.y;
            contacts.down = true;
        } else {
            pos.y = solid.max().y + half.y;
        }
        vel.y = 0.0;
    }

    contacts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> Aabb {
        Aabb::new(Vec2::new(128.0, 168.0), Vec2::new(256.0, 16.0))
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Aabb::new(Vec2::new(0.0, 0.0), Vec2::splat(16.0));
        let b = Aabb::new(Vec2::new(16.0, 0.0), Vec2::splat(16.0));
        assert!(!a.overlaps(&b));
        let c = Aabb::new(Vec2::new(15.0, 0.0), Vec2::splat(16.0));
        assert!(a.overlaps(&c));
    }

    #[test]
    fn falling_body_lands_on_floor() {
        let mut pos = Vec2::new(50.0, 150.0);
        let mut vel = Vec2::new(0.0, 300.0);
        let contacts = move_and_collide(&mut pos, &mut vel, Vec2::splat(8.0), 1.0 / 60.0, &[floor()]);
        assert!(contacts.down);
        assert_eq!(pos.y, 152.0);
        assert_eq!(vel.y, 0.0);
    }

    #[test]
    fn rising_body_bumps_head() {
        let ceiling = Aabb::new(Vec2::new(50.0, 100.0), Vec2::new(48.0, 16.0));
        let mut pos = Vec2::new(50.0, 117.0);
        let mut vel = Vec2::new(0.0, -300.0);
        let contacts = move_and_collide(&mut pos, &mut vel, Vec2::splat(8.0), 1.0 / 60.0, &[ceiling]);
        assert!(!contacts.down);
        assert_eq!(pos.y, 116.0);
        assert_eq!(vel.y, 0.0);
    }

    #[test]
    fn walking_into_a_block_stops_sideways() {
        let block = Aabb::new(Vec2::new(100.0, 152.0), Vec2::new(16.0, 16.0));
        let mut pos = Vec2::new(82.0, 152.0);
        let mut vel = Vec2::new(160.0, 0.0);
        let contacts = move_and_collide(&mut pos, &mut vel, Vec2::splat(8.0), 1.0 / 60.0, &[block]);
        assert!(!contacts.down);
        assert_eq!(pos.x, 84.0);
        assert_eq!(vel.x, 0.0);
    }

    #[test]
    fn standing_still_on_floor_stays_grounded() {
        let mut pos = Vec2::new(50.0, 152.0);
        let mut vel = Vec2::ZERO;
        // Gravity for one frame pushes slightly into the floor.
        vel.y += 800.0 / 60.0;
        let contacts = move_and_collide(&mut pos, &mut vel, Vec2::splat(8.0), 1.0 / 60.0, &[floor()]);
        assert!(contacts.down);
        assert_eq!(pos.y, 152.0);
    }
}
