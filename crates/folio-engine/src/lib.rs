pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod assets;
pub mod extensions;
pub mod stages;
pub mod instance;
pub mod host;

// Re-export key types at crate root for convenience
pub use api::config::{ContentBoxDef, GameConfig, PlatformDef};
pub use api::context::{EngineContext, LoadingText};
pub use api::types::{Button, ContentType, EntityId, Facing, Theme};
pub use bridge::{handler, BridgeEvent, EventBridge, EventKind, Handler};
pub use components::animation::{AnimationComponent, AnimationDef, Pose};
pub use components::entity::Entity;
pub use components::layer::RenderLayer;
pub use components::shape::ShapeComponent;
pub use components::sprite::{AtlasId, SpriteComponent};
pub use core::collision::{move_and_collide, Aabb, Contacts};
pub use core::scene::Scene;
pub use core::stage::{Stage, StageFlow, StageKind, StageManager};
pub use core::time::{FixedTimestep, Timer};
pub use renderer::instance::{RenderBuffer, ShapeInstance, SpriteInstance};
pub use input::queue::{InputEvent, InputQueue};
pub use input::state::{keys, InputState, Intent, VirtualPad};
pub use input::virtual_buttons::VirtualButtons;
pub use assets::manifest::AssetManifest;
pub use assets::registry::{LoadedAssets, RenderScheme, SpriteRegistry};
pub use assets::source::{AssetOutcome, AssetQueueHandle, AssetRequest, AssetSource, QueuedAssetSource};
pub use stages::{GameplayStage, PreloadStage};
pub use instance::GameInstance;
pub use host::{Announcement, Container, GameHost, HostView, Priority};
pub use systems::animation::tick_animations;
pub use systems::render::build_render_buffer;

// Extensions
pub use extensions::easing::Easing;
pub use extensions::tween::{Axis, Tween, TweenLoop, TweenState};
