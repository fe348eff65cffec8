//! Publish/subscribe hub shared by the game loop and the hosting page.
//!
//! Single-threaded and synchronous: `publish` runs every handler on the calling turn, in
//! subscription order, before it returns. The bridge is a cheap handle; clones share one
//! registry, so the host and the engine each hold their own copy.
//!
//! Handlers must not re-publish the same event from inside themselves without a stopping
//! condition; recursion is not guarded.

use std::cell::RefCell;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use super::events::{BridgeEvent, EventKind};

/// A subscriber callback. Identity is the `Rc` allocation, so keep the handle around to
/// unsubscribe later.
pub type Handler = Rc<dyn Fn(&BridgeEvent) -> anyhow::Result<()>>;

/// Wrap a closure as a [`Handler`].
pub fn handler(f: impl Fn(&BridgeEvent) -> anyhow::Result<()> + 'static) -> Handler {
    Rc::new(f)
}

fn same_handler(a: &Handler, b: &Handler) -> bool {
    // Compare data pointers only; vtable pointers are not stable across codegen units.
    std::ptr::eq(Rc::as_ptr(a) as *const (), Rc::as_ptr(b) as *const ())
}

#[derive(Clone, Default)]
pub struct EventBridge {
    handlers: Rc<RefCell<HashMap<EventKind, Vec<Handler>>>>,
}

impl EventBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler for `kind`. Subscribing the same handler twice makes it run twice.
    pub fn subscribe(&self, kind: EventKind, handler: Handler) {
        self.handlers.borrow_mut().entry(kind).or_default().push(handler);
    }

    /// Remove the first registration of `handler` for `kind`. Unknown handlers are ignored.
    pub fn unsubscribe(&self, kind: EventKind, handler: &Handler) {
        let mut handlers = self.handlers.borrow_mut();
        if let Some(list) = handlers.get_mut(&kind) {
            if let Some(idx) = list.iter().position(|h| same_handler(h, handler)) {
                list.remove(idx);
            }
            if list.is_empty() {
                handlers.remove(&kind);
            }
        }
    }

    /// Run every handler registered for the event's channel. Returns how many ran.
    ///
    /// Handler errors and panics are logged and swallowed; the remaining handlers still run.
    /// Registrations made or removed during dispatch apply from the next publish.
    pub fn publish(&self, event: BridgeEvent) -> usize {
        let kind = event.kind();
        let snapshot: Vec<Handler> = match self.handlers.borrow().get(&kind) {
            Some(list) => list.clone(),
            None => return 0,
        };

        for handler in &snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(&event))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => log::error!("EventBridge error on {}: {:#}", kind.name(), err),
                Err(_) => log::error!("EventBridge handler panicked on {}", kind.name()),
            }
        }

        snapshot.len()
    }

    /// Remove all handlers for one channel, or for every channel when `kind` is `None`.
    pub fn clear(&self, kind: Option<EventKind>) {
        let mut handlers = self.handlers.borrow_mut();
        match kind {
            Some(kind) => {
                handlers.remove(&kind);
            }
            None => handlers.clear(),
        }
    }

    /// Number of registrations currently held for `kind`.
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.borrow().get(&kind).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = self.handlers.borrow();
        let total: usize = handlers.values().map(Vec::len).sum();
        f.debug_struct("EventBridge")
            .field("channels", &handlers.len())
            .field("handlers", &total)
            .finish()
    }
}
