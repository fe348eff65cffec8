use anyhow::{ensure, Context};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::api::types::ContentType;

/// A static rectangle, stored by center and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformDef {
    pub center: Vec2,
    pub size: Vec2,
}

/// Placement of one content box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentBoxDef {
    pub content: ContentType,
    pub center: Vec2,
    /// Placeholder/tint colour as 0xRRGGBB.
    pub tint: u32,
}

/// Every tunable of the game. Partial JSON documents overlay the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// World width in game units.
    pub world_width: f32,
    /// World height in game units.
    pub world_height: f32,

    // -- Player physics --
    pub gravity: f32,
    /// Horizontal speed while a direction is held; also the speed cap.
    pub player_speed: f32,
    /// Vertical velocity applied on jump (negative is up).
    pub jump_velocity: f32,
    pub ground_friction: f32,
    pub air_friction: f32,
    /// Horizontal speed under which friction snaps velocity to zero.
    pub friction_snap: f32,
    /// Horizontal speed above which a grounded player shows the walk cycle.
    pub walk_threshold: f32,
    pub player_size: Vec2,
    pub player_spawn: Vec2,

    // -- World --
    /// Top of the ground strip.
    pub ground_level: f32,
    pub ground_tile: f32,
    pub ground_color: u32,
    pub platforms: Vec<PlatformDef>,
    pub content_boxes: Vec<ContentBoxDef>,
    /// Collision size of a content box.
    pub box_hit_size: Vec2,
    /// Drawn size of a content box.
    pub box_display_size: Vec2,
    pub bounce_height: f32,
    pub bounce_duration: f32,

    // -- Areas --
    /// Distance from a world edge that starts an area transition.
    pub edge_margin: f32,
    /// Where the player re-enters from the opposite edge.
    pub reentry_inset: f32,
    pub area_tween_duration: f32,

    // -- Loading & input timing --
    pub settle_delay: f32,
    pub load_timeout: f32,
    pub label_blink: f32,
    pub button_debounce: f32,
    pub walk_fps: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            world_width: 256.0,
            world_height: 192.0,

            gravity: 800.0,
            player_speed: 160.0,
            jump_velocity: -500.0,
            ground_friction: 800.0,
            air_friction: 300.0,
            friction_snap: 10.0,
            walk_threshold: 10.0,
            player_size: Vec2::new(16.0, 16.0),
            player_spawn: Vec2::new(32.0, 100.0),

            ground_level: 160.0,
            ground_tile: 16.0,
            ground_color: 0x8b4513,
            platforms: vec![
                PlatformDef { center: Vec2::new(64.0, 120.0), size: Vec2::new(48.0, 16.0) },
                PlatformDef { center: Vec2::new(192.0, 100.0), size: Vec2::new(48.0, 16.0) },
            ],
            content_boxes: vec![
                ContentBoxDef { content: ContentType::Resume, center: Vec2::new(80.0, 128.0), tint: 0xffd700 },
                ContentBoxDef { content: ContentType::Portfolio, center: Vec2::new(128.0, 128.0), tint: 0x00ff00 },
                ContentBoxDef { content: ContentType::Contact, center: Vec2::new(176.0, 128.0), tint: 0x0080ff },
            ],
            box_hit_size: Vec2::new(32.0, 32.0),
            box_display_size: Vec2::new(24.0, 24.0),
            bounce_height: 10.0,
            bounce_duration: 0.1,

            edge_margin: 10.0,
            reentry_inset: 30.0,
            area_tween_duration: 0.3,

            settle_delay: 0.5,
            load_timeout: 5.0,
            label_blink: 0.5,
            button_debounce: 0.15,
            walk_fps: 8.0,
        }
    }
}

impl GameConfig {
    /// Overlay a (possibly partial) JSON document on the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.fixed_dt > 0.0, "fixed_dt must be positive, got {}", self.fixed_dt);
        ensure!(
            self.world_width > 0.0 && self.world_height > 0.0,
            "world size must be positive, got {}x{}",
            self.world_width,
            self.world_height
        );
        ensure!(
            self.player_size.x > 0.0 && self.player_size.y > 0.0,
            "player size must be positive"
        );
        ensure!(self.ground_tile > 0.0, "ground tile must be positive");
        ensure!(self.player_speed >= 0.0, "player speed must not be negative");
        ensure!(self.walk_fps > 0.0, "walk_fps must be positive, got {}", self.walk_fps);
        for (name, value) in [
            ("bounce_duration", self.bounce_duration),
            ("area_tween_duration", self.area_tween_duration),
            ("settle_delay", self.settle_delay),
            ("load_timeout", self.load_timeout),
            ("label_blink", self.label_blink),
            ("button_debounce", self.button_debounce),
        ] {
            ensure!(value >= 0.0, "{} must not be negative, got {}", name, value);
        }
        ensure!(
            self.reentry_inset < self.world_width / 2.0,
            "re-entry inset {} does not fit a {}-wide world",
            self.reentry_inset,
            self.world_width
        );
        for (i, platform) in self.platforms.iter().enumerate() {
            ensure!(
                platform.size.x > 0.0 && platform.size.y > 0.0,
                "platform {} has a non-positive size",
                i
            );
        }
        Ok(())
    }

    /// Parse and validate in one step, with context for the caller's log line.
    pub fn load(json: &str) -> anyhow::Result<Self> {
        let config = Self::from_json(json).context("parsing game config")?;
        config.validate().context("validating game config")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.content_boxes.len(), 3);
        assert_eq!(config.player_speed, 160.0);
    }

    #[test]
    fn partial_json_overlays_defaults() {
        let config = GameConfig::from_json(r#"{ "gravity": 600.0, "player_speed": 120.0 }"#).unwrap();
        assert_eq!(config.gravity, 600.0);
        assert_eq!(config.player_speed, 120.0);
        assert_eq!(config.jump_velocity, -500.0);
        assert_eq!(config.platforms.len(), 2);
    }

    #[test]
    fn invalid_world_is_rejected() {
        let err = GameConfig::load(r#"{ "world_width": 0.0 }"#).unwrap_err();
        assert!(format!("{:#}", err).contains("world size"));
    }

    #[test]
    fn animation_and_timing_values_are_checked() {
        let err = GameConfig::load(r#"{ "walk_fps": -8.0 }"#).unwrap_err();
        assert!(format!("{:#}", err).contains("walk_fps"));
        assert!(GameConfig::load(r#"{ "walk_fps": 0.0 }"#).is_err());

        let err = GameConfig::load(r#"{ "button_debounce": -0.1 }"#).unwrap_err();
        assert!(format!("{:#}", err).contains("button_debounce"));
        assert!(GameConfig::load(r#"{ "bounce_duration": -1.0 }"#).is_err());
        assert!(GameConfig::load(r#"{ "area_tween_duration": 0.0, "label_blink": 0.0 }"#).is_ok());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(GameConfig::from_json("{ gravity: ").is_err());
    }
}
