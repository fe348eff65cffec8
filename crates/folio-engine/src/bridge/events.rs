//! Typed channels of the event bridge.
//!
//! Every channel has a stable wire name (the strings the hosting page listens for) and
//! a payload shape; `BridgeEvent::payload` renders that shape as JSON for the page.

use serde_json::{json, Value};

use crate::api::types::{Button, ContentType, EntityId, Theme};
use crate::core::stage::StageKind;

/// Channel identifier. One per wire event name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    GameReady,
    GameDestroyed,
    SceneReady,
    AssetsLoading,
    LoadingProgress,
    AssetsLoaded,
    PlayerJumped,
    BoxHit,
    ContentTrigger,
    AreaChanged,
    ButtonPressed,
    GameboyButtonPress,
    GameboyButtonRelease,
    DpadLeft,
    DpadRight,
    ButtonA,
    ButtonB,
}

impl EventKind {
    pub const ALL: [EventKind; 17] = [
        EventKind::GameReady,
        EventKind::GameDestroyed,
        EventKind::SceneReady,
        EventKind::AssetsLoading,
        EventKind::LoadingProgress,
        EventKind::AssetsLoaded,
        EventKind::PlayerJumped,
        EventKind::BoxHit,
        EventKind::ContentTrigger,
        EventKind::AreaChanged,
        EventKind::ButtonPressed,
        EventKind::GameboyButtonPress,
        EventKind::GameboyButtonRelease,
        EventKind::DpadLeft,
        EventKind::DpadRight,
        EventKind::ButtonA,
        EventKind::ButtonB,
    ];

    /// Wire name of the channel.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::GameReady => "game-ready",
            EventKind::GameDestroyed => "game-destroyed",
            EventKind::SceneReady => "scene-ready",
            EventKind::AssetsLoading => "assets-loading",
            EventKind::LoadingProgress => "loading-progress",
            EventKind::AssetsLoaded => "assets-loaded",
            EventKind::PlayerJumped => "player-jumped",
            EventKind::BoxHit => "box-hit",
            EventKind::ContentTrigger => "content-trigger",
            EventKind::AreaChanged => "area-changed",
            EventKind::ButtonPressed => "button-pressed",
            EventKind::GameboyButtonPress => "gameboy-button-press",
            EventKind::GameboyButtonRelease => "gameboy-button-release",
            EventKind::DpadLeft => "gameboy-dpad-left",
            EventKind::DpadRight => "gameboy-dpad-right",
            EventKind::ButtonA => "gameboy-button-a",
            EventKind::ButtonB => "gameboy-button-b",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// An event travelling across the bridge, with its typed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    /// Gameplay fully initialized; the host hides its loading UI.
    GameReady,
    /// The game instance was torn down.
    GameDestroyed,
    /// A stage finished constructing its scene.
    SceneReady { stage: StageKind },
    /// Preload started requesting assets.
    AssetsLoading,
    /// Asset load percentage, 0..=100, never decreasing within one load.
    LoadingProgress(u8),
    /// Every requested asset has settled (loaded or given up on).
    AssetsLoaded,
    PlayerJumped,
    /// The player started overlapping a content box.
    BoxHit { content: ContentType, entity: EntityId },
    /// Navigation signal for the hosting page.
    ContentTrigger(ContentType),
    /// An area transition was committed.
    AreaChanged { area: u32, theme: Theme },
    /// A named virtual button went down or up through the host.
    ButtonPressed { button: Button, pressed: bool },
    /// Momentary press from the virtual button widget.
    GameboyButtonPress(Button),
    /// Momentary release from the virtual button widget (explicit or automatic).
    GameboyButtonRelease(Button),
    DpadLeft { pressed: bool },
    DpadRight { pressed: bool },
    ButtonA { pressed: bool },
    ButtonB { pressed: bool },
}

impl BridgeEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BridgeEvent::GameReady => EventKind::GameReady,
            BridgeEvent::GameDestroyed => EventKind::GameDestroyed,
            BridgeEvent::SceneReady { .. } => EventKind::SceneReady,
            BridgeEvent::AssetsLoading => EventKind::AssetsLoading,
            BridgeEvent::LoadingProgress(_) => EventKind::LoadingProgress,
            BridgeEvent::AssetsLoaded => EventKind::AssetsLoaded,
            BridgeEvent::PlayerJumped => EventKind::PlayerJumped,
            BridgeEvent::BoxHit { .. } => EventKind::BoxHit,
            BridgeEvent::ContentTrigger(_) => EventKind::ContentTrigger,
            BridgeEvent::AreaChanged { .. } => EventKind::AreaChanged,
            BridgeEvent::ButtonPressed { .. } => EventKind::ButtonPressed,
            BridgeEvent::GameboyButtonPress(_) => EventKind::GameboyButtonPress,
            BridgeEvent::GameboyButtonRelease(_) => EventKind::GameboyButtonRelease,
            BridgeEvent::DpadLeft { .. } => EventKind::DpadLeft,
            BridgeEvent::DpadRight { .. } => EventKind::DpadRight,
            BridgeEvent::ButtonA { .. } => EventKind::ButtonA,
            BridgeEvent::ButtonB { .. } => EventKind::ButtonB,
        }
    }

    /// Wire name of this event's channel.
    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// JSON payload handed to page listeners. Events without a payload yield `null`.
    pub fn payload(&self) -> Value {
        match self {
            BridgeEvent::GameReady
            | BridgeEvent::GameDestroyed
            | BridgeEvent::AssetsLoading
            | BridgeEvent::AssetsLoaded
            | BridgeEvent::PlayerJumped => Value::Null,
            BridgeEvent::SceneReady { stage } => json!({ "scene": stage.as_str() }),
            BridgeEvent::LoadingProgress(percent) => json!(percent),
            BridgeEvent::BoxHit { content, entity } => json!({
                "contentType": content,
                "entity": entity.0,
            }),
            BridgeEvent::ContentTrigger(content) => json!(content),
            BridgeEvent::AreaChanged { area, theme } => json!({ "area": area, "theme": theme }),
            BridgeEvent::ButtonPressed { button, pressed } => {
                json!({ "button": button, "pressed": pressed })
            }
            BridgeEvent::GameboyButtonPress(button) => json!({ "button": button, "pressed": true }),
            BridgeEvent::GameboyButtonRelease(button) => json!({ "button": button, "pressed": false }),
            BridgeEvent::DpadLeft { pressed }
            | BridgeEvent::DpadRight { pressed }
            | BridgeEvent::ButtonA { pressed }
            | BridgeEvent::ButtonB { pressed } => json!({ "pressed": pressed }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_parse_back_to_kinds() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(EventKind::from_name("player-moved"), None);
    }

    #[test]
    fn payload_shapes_match_page_contract() {
        let hit = BridgeEvent::BoxHit { content: ContentType::Resume, entity: EntityId(7) };
        assert_eq!(hit.payload(), json!({ "contentType": "resume", "entity": 7 }));

        let trigger = BridgeEvent::ContentTrigger(ContentType::Contact);
        assert_eq!(trigger.payload(), json!("contact"));

        let area = BridgeEvent::AreaChanged { area: 1, theme: Theme::Underground };
        assert_eq!(area.payload(), json!({ "area": 1, "theme": "underground" }));

        assert_eq!(BridgeEvent::LoadingProgress(42).payload(), json!(42));
        assert_eq!(BridgeEvent::GameReady.payload(), Value::Null);
        assert_eq!(
            BridgeEvent::GameboyButtonRelease(Button::A).payload(),
            json!({ "button": "A", "pressed": false })
        );
        assert_eq!(BridgeEvent::DpadLeft { pressed: true }.payload(), json!({ "pressed": true }));
    }

    #[test]
    fn kind_matches_variant() {
        assert_eq!(BridgeEvent::AssetsLoaded.kind(), EventKind::AssetsLoaded);
        assert_eq!(BridgeEvent::ButtonB { pressed: false }.name(), "gameboy-button-b");
    }
}
