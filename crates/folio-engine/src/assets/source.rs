//! Where textures come from.
//!
//! The engine never fetches anything itself. A stage calls [`AssetSource::request`] and
//! later drains finished loads with [`AssetSource::poll`]. In the browser the page does
//! the fetching and reports back through an [`AssetQueueHandle`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use anyhow::anyhow;
use serde::Serialize;

/// One texture fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRequest {
    /// Manifest name (atlas or image). A fallback retry reuses the key.
    pub key: String,
    pub path: String,
}

/// Decoded texture metadata reported by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureInfo {
    pub width: u32,
    pub height: u32,
}

/// Result of one request.
#[derive(Debug)]
pub struct AssetOutcome {
    pub key: String,
    pub path: String,
    pub result: anyhow::Result<TextureInfo>,
}

pub trait AssetSource {
    /// Start fetching. Completion is reported by a later `poll`.
    fn request(&mut self, request: &AssetRequest);

    /// Drain every load that finished since the last call.
    fn poll(&mut self) -> Vec<AssetOutcome>;
}

#[derive(Debug, Default)]
struct AssetQueue {
    requested: VecDeque<AssetRequest>,
    outcomes: Vec<AssetOutcome>,
}

/// An [`AssetSource`] fed from outside: requests queue up until someone takes them,
/// and outcomes are pushed in whenever the fetch finishes.
#[derive(Debug, Default)]
pub struct QueuedAssetSource {
    queue: Rc<RefCell<AssetQueue>>,
}

/// Shared handle onto a [`QueuedAssetSource`]'s queue.
#[derive(Debug, Clone)]
pub struct AssetQueueHandle {
    queue: Rc<RefCell<AssetQueue>>,
}

impl QueuedAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> AssetQueueHandle {
        AssetQueueHandle {
            queue: self.queue.clone(),
        }
    }
}

impl AssetSource for QueuedAssetSource {
    fn request(&mut self, request: &AssetRequest) {
        log::debug!("Requesting asset {} from {}", request.key, request.path);
        self.queue.borrow_mut().requested.push_back(request.clone());
    }

    fn poll(&mut self) -> Vec<AssetOutcome> {
        std::mem::take(&mut self.queue.borrow_mut().outcomes)
    }
}

impl AssetQueueHandle {
    /// Take every request not yet handed out.
    pub fn take_requests(&self) -> Vec<AssetRequest> {
        self.queue.borrow_mut().requested.drain(..).collect()
    }

    pub fn pending_requests(&self) -> usize {
        self.queue.borrow().requested.len()
    }

    pub fn loaded(&self, key: &str, path: &str, width: u32, height: u32) {
        self.push(key, path, Ok(TextureInfo { width, height }));
    }

    pub fn failed(&self, key: &str, path: &str, reason: &str) {
        self.push(key, path, Err(anyhow!("{}", reason)));
    }

    fn push(&self, key: &str, path: &str, result: anyhow::Result<TextureInfo>) {
        self.queue.borrow_mut().outcomes.push(AssetOutcome {
            key: key.to_string(),
            path: path.to_string(),
            result,
        });
    }
}
