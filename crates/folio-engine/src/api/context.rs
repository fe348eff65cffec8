use crate::api::config::GameConfig;
use crate::api::types::{EntityId, Theme};
use crate::assets::registry::LoadedAssets;
use crate::bridge::{BridgeEvent, EventBridge};
use crate::core::scene::Scene;
use crate::extensions::tween::TweenState;

/// Text the loading screen shows while Preload runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadingText {
    /// Blinking title ("MARIO", "MARIO.", ...).
    pub title: String,
    /// "Loading... 42%" or "Ready!".
    pub status: String,
}

/// Mutable engine state shared by the stages of one game instance.
pub struct EngineContext {
    pub config: GameConfig,
    pub bridge: EventBridge,
    pub scene: Scene,
    pub tweens: TweenState,
    /// Filled by Preload, read by gameplay.
    pub assets: LoadedAssets,
    /// Theme of the area currently on screen.
    pub theme: Theme,
    /// Present only while the loading screen is up.
    pub loading: Option<LoadingText>,
    next_id: u32,
}

impl EngineContext {
    pub fn new(config: GameConfig, bridge: EventBridge) -> Self {
        Self {
            config,
            bridge,
            scene: Scene::new(),
            tweens: TweenState::new(),
            assets: LoadedAssets::default(),
            theme: Theme::default(),
            loading: None,
            next_id: 1,
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Publish on the bridge. Returns how many handlers ran.
    pub fn emit(&self, event: BridgeEvent) -> usize {
        self.bridge.publish(event)
    }

    /// Drop every entity and tween; used between stages.
    pub fn reset_scene(&mut self) {
        self.scene.clear();
        self.tweens.clear();
    }
}
