//! Frame animation for the player sprite.
//!
//! Sequences are keyed by [`Pose`]; gameplay picks the pose each frame from the player's
//! physical state and the component only advances frames within it.

use std::collections::HashMap;

/// Visual pose of an animated actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pose {
    #[default]
    Idle,
    Walk,
    Jump,
}

/// Definition of a single animation sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationDef {
    /// Frame indices as (col, row) pairs in the atlas.
    pub frames: Vec<(f32, f32)>,
    /// Seconds per frame.
    pub frame_duration: f32,
    /// Whether to loop when reaching the end.
    pub looping: bool,
}

impl AnimationDef {
    /// Create from explicit frame list.
    pub fn from_frames(frames: Vec<(f32, f32)>, fps: f32, looping: bool) -> Self {
        Self {
            frames,
            frame_duration: 1.0 / fps,
            looping,
        }
    }

    /// A single held frame.
    pub fn still(frame: (f32, f32)) -> Self {
        Self {
            frames: vec![frame],
            frame_duration: 1.0,
            looping: false,
        }
    }
}

/// Animation state for an entity.
#[derive(Debug, Clone, Default)]
pub struct AnimationComponent {
    pub animations: HashMap<Pose, AnimationDef>,
    /// Currently playing pose.
    pub current: Pose,
    /// Current frame index.
    pub frame_index: usize,
    /// Time accumulated in current frame.
    pub frame_timer: f32,
}

impl AnimationComponent {
    pub fn new(animations: HashMap<Pose, AnimationDef>) -> Self {
        Self {
            animations,
            ..Default::default()
        }
    }

    pub fn add(&mut self, pose: Pose, def: AnimationDef) {
        self.animations.insert(pose, def);
    }

    /// Switch pose. Re-selecting the current pose keeps the cycle running.
    pub fn play(&mut self, pose: Pose) {
        if self.current != pose {
            self.current = pose;
            self.frame_index = 0;
            self.frame_timer = 0.0;
        }
    }

    pub fn current_def(&self) -> Option<&AnimationDef> {
        self.animations.get(&self.current)
    }

    /// Current frame (col, row) for sprite rendering.
    pub fn current_frame(&self) -> Option<(f32, f32)> {
        self.current_def()
            .and_then(|def| def.frames.get(self.frame_index).copied())
    }

    /// Advance animation by dt seconds. Returns true if frame changed.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(def) = self.animations.get(&self.current) else {
            return false;
        };
        if def.frames.len() < 2 || !def.frame_duration.is_finite() || def.frame_duration <= 0.0 {
            return false;
        }

        self.frame_timer += dt;
        let mut frame_changed = false;

        while self.frame_timer >= def.frame_duration {
            self.frame_timer -= def.frame_duration;
            if self.frame_index + 1 < def.frames.len() {
                self.frame_index += 1;
            } else if def.looping {
                self.frame_index = 0;
            } else {
                self.frame_timer = 0.0;
                break;
            }
            frame_changed = true;
        }

        frame_changed
    }
}
