//! Folding raw input into what gameplay asks each frame: which way is held, and
//! whether a jump was requested.
//!
//! Movement is continuous (held by any source). Jumping is discrete: a request is raised
//! on a press edge and consumed by the next gameplay step, grounded or not.

use std::collections::HashSet;

use crate::api::types::Button;
use crate::bridge::BridgeEvent;
use crate::input::queue::InputEvent;

/// Browser key codes the game reacts to.
pub mod keys {
    pub const SPACE: u32 = 32;
    pub const LEFT: u32 = 37;
    pub const UP: u32 = 38;
    pub const RIGHT: u32 = 39;
    pub const DOWN: u32 = 40;
    pub const A: u32 = 65;
    pub const D: u32 = 68;
    pub const S: u32 = 83;
    pub const W: u32 = 87;
}

/// Keyboard and host-button state.
#[derive(Debug, Default)]
pub struct InputState {
    keys: HashSet<u32>,
    buttons: HashSet<Button>,
    jump_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown { key_code } => {
                // Key repeat sends more downs; only the first one counts as a press.
                if self.keys.insert(key_code) && key_code == keys::SPACE {
                    self.jump_requested = true;
                }
            }
            InputEvent::KeyUp { key_code } => {
                self.keys.remove(&key_code);
            }
            InputEvent::ButtonDown(button) => {
                if self.buttons.insert(button) && (button.is_action() || button == Button::Up) {
                    self.jump_requested = true;
                }
            }
            InputEvent::ButtonUp(button) => {
                self.buttons.remove(&button);
            }
        }
    }

    pub fn key_held(&self, key_code: u32) -> bool {
        self.keys.contains(&key_code)
    }

    pub fn button_held(&self, button: Button) -> bool {
        self.buttons.contains(&button)
    }

    pub fn left_held(&self) -> bool {
        self.key_held(keys::LEFT) || self.key_held(keys::A) || self.button_held(Button::Left)
    }

    pub fn right_held(&self) -> bool {
        self.key_held(keys::RIGHT) || self.key_held(keys::D) || self.button_held(Button::Right)
    }

    /// Up or W held; holding it keeps asking for a jump.
    pub fn up_held(&self) -> bool {
        self.key_held(keys::UP) || self.key_held(keys::W) || self.button_held(Button::Up)
    }

    /// Consume the pending jump request.
    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump_requested) || self.up_held()
    }

    /// Forget everything held; used when a stage starts.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.buttons.clear();
        self.jump_requested = false;
    }
}

/// D-pad and action state coming from the virtual button widget over the bridge.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VirtualPad {
    pub left: bool,
    pub right: bool,
    jump_requested: bool,
}

impl VirtualPad {
    /// Fold one bridge event in. Returns false for events the pad ignores.
    pub fn handle(&mut self, event: &BridgeEvent) -> bool {
        match *event {
            BridgeEvent::DpadLeft { pressed } => self.left = pressed,
            BridgeEvent::DpadRight { pressed } => self.right = pressed,
            BridgeEvent::ButtonA { pressed } | BridgeEvent::ButtonB { pressed } => {
                if pressed {
                    self.jump_requested = true;
                }
            }
            _ => return false,
        }
        true
    }

    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump_requested)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Resolved per-frame intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent {
    /// -1 left, 0 none, 1 right.
    pub direction: i8,
    pub jump: bool,
}

impl Intent {
    /// Combine both input paths. Left wins when both directions are held.
    pub fn resolve(input: &mut InputState, pad: &mut VirtualPad) -> Self {
        let direction = if input.left_held() || pad.left {
            -1
        } else if input.right_held() || pad.right {
            1
        } else {
            0
        };
        // Consume both so neither carries a stale request into a later frame.
        let keyboard_jump = input.take_jump();
        let pad_jump = pad.take_jump();
        Self {
            direction,
            jump: keyboard_jump || pad_jump,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_and_letter_keys_both_steer() {
        let mut input = InputState::new();
        input.apply(InputEvent::KeyDown { key_code: keys::A });
        assert!(input.left_held());
        input.apply(InputEvent::KeyUp { key_code: keys::A });
        input.apply(InputEvent::KeyDown { key_code: keys::RIGHT });
        assert!(input.right_held());
        assert!(!input.left_held());
    }

    #[test]
    fn space_press_requests_one_jump() {
        let mut input = InputState::new();
        input.apply(InputEvent::KeyDown { key_code: keys::SPACE });
        input.apply(InputEvent::KeyDown { key_code: keys::SPACE }); // key repeat
        assert!(input.take_jump());
        assert!(!input.take_jump());
    }

    #[test]
    fn holding_up_keeps_requesting() {
        let mut input = InputState::new();
        input.apply(InputEvent::KeyDown { key_code: keys::W });
        assert!(input.take_jump());
        assert!(input.take_jump());
        input.apply(InputEvent::KeyUp { key_code: keys::W });
        assert!(!input.take_jump());
    }

    #[test]
    fn host_buttons_hold_and_jump() {
        let mut input = InputState::new();
        input.apply(InputEvent::ButtonDown(Button::Left));
        input.apply(InputEvent::ButtonDown(Button::B));
        assert!(input.left_held());
        assert!(input.take_jump());
        input.apply(InputEvent::ButtonUp(Button::Left));
        assert!(!input.left_held());
    }

    #[test]
    fn pad_tracks_dpad_and_action_presses() {
        let mut pad = VirtualPad::default();
        assert!(pad.handle(&BridgeEvent::DpadRight { pressed: true }));
        assert!(pad.right);
        assert!(pad.handle(&BridgeEvent::ButtonA { pressed: false }));
        assert!(!pad.take_jump());
        pad.handle(&BridgeEvent::ButtonA { pressed: true });
        assert!(pad.take_jump());
        assert!(!pad.handle(&BridgeEvent::GameReady));
    }

    #[test]
    fn left_takes_precedence() {
        let mut input = InputState::new();
        let mut pad = VirtualPad::default();
        input.apply(InputEvent::KeyDown { key_code: keys::RIGHT });
        pad.handle(&BridgeEvent::DpadLeft { pressed: true });
        let intent = Intent::resolve(&mut input, &mut pad);
        assert_eq!(intent.direction, -1);
        assert!(!intent.jump);
    }
}
