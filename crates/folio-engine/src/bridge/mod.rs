pub mod event_bus;
pub mod events;

pub use event_bus::{handler, EventBridge, Handler};
pub use events::{BridgeEvent, EventKind};
