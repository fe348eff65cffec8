pub mod queue;
pub mod state;
pub mod virtual_buttons;

pub use queue::{InputEvent, InputQueue};
pub use state::{keys, InputState, Intent, VirtualPad};
pub use virtual_buttons::VirtualButtons;
