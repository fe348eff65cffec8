use serde::{Deserialize, Serialize};

/// Unique identifier for an entity in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// What a content box navigates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Resume,
    Portfolio,
    Contact,
}

impl ContentType {
    pub const ALL: [ContentType; 3] = [ContentType::Resume, ContentType::Portfolio, ContentType::Contact];

    /// Wire label used by the hosting page ("resume" | "portfolio" | "contact").
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Resume => "resume",
            ContentType::Portfolio => "portfolio",
            ContentType::Contact => "contact",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "resume" => Some(ContentType::Resume),
            "portfolio" => Some(ContentType::Portfolio),
            "contact" => Some(ContentType::Contact),
            _ => None,
        }
    }

    /// Human-readable section name, used for announcements.
    pub fn section_name(self) -> &'static str {
        match self {
            ContentType::Resume => "Resume",
            ContentType::Portfolio => "Portfolio",
            ContentType::Contact => "Contact",
        }
    }
}

/// A GameBoy-style virtual button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Button {
    #[serde(rename = "up")]
    Up,
    #[serde(rename = "down")]
    Down,
    #[serde(rename = "left")]
    Left,
    #[serde(rename = "right")]
    Right,
    A,
    B,
    #[serde(rename = "START")]
    Start,
    #[serde(rename = "SELECT")]
    Select,
}

impl Button {
    pub fn as_str(self) -> &'static str {
        match self {
            Button::Up => "up",
            Button::Down => "down",
            Button::Left => "left",
            Button::Right => "right",
            Button::A => "A",
            Button::B => "B",
            Button::Start => "START",
            Button::Select => "SELECT",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "up" => Some(Button::Up),
            "down" => Some(Button::Down),
            "left" => Some(Button::Left),
            "right" => Some(Button::Right),
            "A" => Some(Button::A),
            "B" => Some(Button::B),
            "START" => Some(Button::Start),
            "SELECT" => Some(Button::Select),
            _ => None,
        }
    }

    /// Left/right are held for as long as the player keeps them down.
    pub fn is_direction(self) -> bool {
        matches!(self, Button::Left | Button::Right)
    }

    /// A/B are the action buttons; both make the player jump.
    pub fn is_action(self) -> bool {
        matches!(self, Button::A | Button::B)
    }
}

/// Visual theme of a gameplay area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Overworld,
    Underground,
    Sky,
    Castle,
}

impl Theme {
    const CYCLE: [Theme; 4] = [Theme::Overworld, Theme::Underground, Theme::Sky, Theme::Castle];

    /// Theme for an area index. Areas past the last theme wrap around.
    pub fn for_area(area: u32) -> Self {
        Self::CYCLE[area as usize % Self::CYCLE.len()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Overworld => "overworld",
            Theme::Underground => "underground",
            Theme::Sky => "sky",
            Theme::Castle => "castle",
        }
    }

    /// Background clear colour (RGB, 0..1).
    pub fn background(self) -> [f32; 3] {
        match self {
            Theme::Overworld => [0.780, 0.827, 0.173],
            Theme::Underground => [0.184, 0.310, 0.310],
            Theme::Sky => [0.529, 0.808, 0.980],
            Theme::Castle => [0.545, 0.0, 0.0],
        }
    }
}

/// Which way the player sprite faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_labels_round_trip() {
        for content in ContentType::ALL {
            assert_eq!(ContentType::parse(content.as_str()), Some(content));
        }
        assert_eq!(ContentType::parse("blog"), None);
    }

    #[test]
    fn button_serializes_with_page_names() {
        assert_eq!(serde_json::to_string(&Button::A).unwrap(), "\"A\"");
        assert_eq!(serde_json::to_string(&Button::Left).unwrap(), "\"left\"");
        assert_eq!(serde_json::to_string(&Button::Start).unwrap(), "\"START\"");
        assert_eq!(Button::parse("SELECT"), Some(Button::Select));
        assert_eq!(Button::parse("select"), None);
    }

    #[test]
    fn themes_cycle_by_area() {
        assert_eq!(Theme::for_area(0), Theme::Overworld);
        assert_eq!(Theme::for_area(1), Theme::Underground);
        assert_eq!(Theme::for_area(3), Theme::Castle);
        assert_eq!(Theme::for_area(4), Theme::Overworld);
        assert_eq!(Theme::for_area(1).as_str(), "underground");
    }
}
