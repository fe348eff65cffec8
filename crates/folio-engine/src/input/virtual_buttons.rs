//! The on-screen GameBoy buttons.
//!
//! Every press is momentary: it publishes a press right away and a release once the
//! debounce window passes without another press of the same button. Left/right also
//! publish their d-pad state, which stays held until an explicit release.

use std::collections::{BTreeMap, HashSet};

use crate::api::types::Button;
use crate::bridge::{BridgeEvent, EventBridge};
use crate::core::time::Timer;

pub struct VirtualButtons {
    bridge: EventBridge,
    debounce: f32,
    /// Buttons inside their debounce window.
    pressed: BTreeMap<Button, Timer>,
    /// D-pad directions held until released.
    held: HashSet<Button>,
}

/// The continuous/discrete channel a button also drives, if any.
fn state_event(button: Button, pressed: bool) -> Option<BridgeEvent> {
    match button {
        Button::Left => Some(BridgeEvent::DpadLeft { pressed }),
        Button::Right => Some(BridgeEvent::DpadRight { pressed }),
        Button::A => Some(BridgeEvent::ButtonA { pressed }),
        Button::B => Some(BridgeEvent::ButtonB { pressed }),
        _ => None,
    }
}

impl VirtualButtons {
    pub fn new(bridge: EventBridge, debounce: f32) -> Self {
        Self {
            bridge,
            debounce,
            pressed: BTreeMap::new(),
            held: HashSet::new(),
        }
    }

    /// Press `button`. A press inside the debounce window restarts it.
    pub fn press(&mut self, button: Button) {
        log::debug!("Virtual button {} pressed", button.as_str());
        self.pressed.insert(button, Timer::once(self.debounce));
        if button.is_direction() {
            self.held.insert(button);
        }
        self.bridge.publish(BridgeEvent::GameboyButtonPress(button));
        if let Some(event) = state_event(button, true) {
            self.bridge.publish(event);
        }
    }

    /// Explicitly let go of `button`. Ignored when it is not down.
    pub fn release(&mut self, button: Button) {
        let was_pressed = self.pressed.remove(&button).is_some();
        let was_held = self.held.remove(&button);
        if !was_pressed && !was_held {
            return;
        }
        self.bridge.publish(BridgeEvent::GameboyButtonRelease(button));
        if let Some(event) = state_event(button, false) {
            self.bridge.publish(event);
        }
    }

    /// Advance debounce windows; buttons whose window ran out are auto-released.
    /// Returns how many auto-released this tick.
    pub fn tick(&mut self, dt: f32) -> usize {
        let expired: Vec<Button> = self
            .pressed
            .iter_mut()
            .filter_map(|(key, timer)| timer.tick(dt).then_some(*key))
            .collect();

        for &button in &expired {
            self.pressed.remove(&button);
            self.bridge.publish(BridgeEvent::GameboyButtonRelease(button));
            // Held directions keep moving until released explicitly.
            if button.is_action() {
                if let Some(event) = state_event(button, false) {
                    self.bridge.publish(event);
                }
            }
        }
        expired.len()
    }

    /// Inside its debounce window or held as a direction.
    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed.contains_key(&button) || self.held.contains(&button)
    }
}
