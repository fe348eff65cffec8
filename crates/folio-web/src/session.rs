use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Context;
use folio_engine::{
    handler, Announcement, AssetManifest, AssetQueueHandle, AssetRequest, BridgeEvent, Button,
    Container, ContentType, EventBridge, EventKind, GameConfig, GameHost, Handler,
    QueuedAssetSource, VirtualButtons,
};

/// Page callback for bridge events. Receives the container id the event came from.
type PageCallback = Rc<dyn Fn(&str, &BridgeEvent) -> anyhow::Result<()>>;

struct Listener {
    kind: EventKind,
    callback: PageCallback,
}

/// A mounted container. Every container gets its own bridge, so one game's events never
/// reach another container's host, pad or widget.
struct Mounted {
    bridge: EventBridge,
    host: GameHost,
    assets: AssetQueueHandle,
    widget: VirtualButtons,
    /// Page listeners attached to this container's bridge, by listener id.
    attached: Vec<(u32, EventKind, Handler)>,
}

impl Mounted {
    fn attach(&mut self, container_id: &str, id: u32, listener: &Listener) {
        let callback = listener.callback.clone();
        let container_id = container_id.to_string();
        let h = handler(move |event| callback(&container_id, event));
        self.bridge.subscribe(listener.kind, h.clone());
        self.attached.push((id, listener.kind, h));
    }

    fn detach(&mut self, id: u32) {
        let bridge = &self.bridge;
        self.attached.retain(|(listener, kind, h)| {
            if *listener != id {
                return true;
            }
            bridge.unsubscribe(*kind, h);
            false
        });
    }
}

/// Everything that lives for one page session: page listeners and one mounted game per
/// container.
///
/// Plain Rust so it runs under native tests; `lib.rs` wraps it in the exported functions.
pub struct Session {
    config: GameConfig,
    manifest: AssetManifest,
    hosts: HashMap<String, Mounted>,
    listeners: HashMap<u32, Listener>,
    next_listener: u32,
}

impl Session {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            manifest: AssetManifest::builtin(),
            hosts: HashMap::new(),
            listeners: HashMap::new(),
            next_listener: 1,
        }
    }

    /// The bridge of a mounted container.
    pub fn bridge(&self, container_id: &str) -> Option<&EventBridge> {
        self.hosts.get(container_id).map(|m| &m.bridge)
    }

    /// Overlay a JSON config on the defaults. Applies to the next mount.
    pub fn configure(&mut self, json: &str) -> anyhow::Result<()> {
        self.config = GameConfig::load(json)?;
        Ok(())
    }

    /// Replace the asset manifest. Applies to the next mount.
    pub fn load_manifest(&mut self, json: &str) -> anyhow::Result<()> {
        self.manifest = AssetManifest::from_json(json).context("parsing asset manifest")?;
        log::info!(
            "Loaded asset manifest: {} atlases, {} images, {} sprites",
            self.manifest.atlases.len(),
            self.manifest.images.len(),
            self.manifest.sprites.len()
        );
        Ok(())
    }

    /// Mount a game into `container`. Refused if that container already has one.
    pub fn mount(
        &mut self,
        container: Container,
        navigate: impl Fn(ContentType) + 'static,
        announce: Option<Box<dyn Fn(&Announcement)>>,
    ) -> bool {
        if self.hosts.contains_key(&container.id) {
            log::warn!("Container {} is already mounted", container.id);
            return false;
        }

        let id = container.id.clone();
        let bridge = EventBridge::new();
        let mut host = GameHost::new(bridge.clone(), container, self.config.clone(), navigate)
            .with_manifest(self.manifest.clone());
        if let Some(announce) = announce {
            host = host.with_announcer(announce);
        }

        let source = QueuedAssetSource::new();
        let mut mounted = Mounted {
            widget: VirtualButtons::new(bridge.clone(), self.config.button_debounce),
            bridge,
            assets: source.handle(),
            host,
            attached: Vec::new(),
        };
        // Page listeners go on first so they see the loading events of this mount.
        for (&listener_id, listener) in &self.listeners {
            mounted.attach(&id, listener_id, listener);
        }
        if !mounted.host.mount(Box::new(source)) {
            return false;
        }
        log::info!("Mounted game in {}", id);
        self.hosts.insert(id, mounted);
        true
    }

    pub fn unmount(&mut self, container_id: &str) -> bool {
        let Some(mut mounted) = self.hosts.remove(container_id) else {
            return false;
        };
        let unmounted = mounted.host.unmount();
        let ids: Vec<u32> = mounted.attached.iter().map(|(id, _, _)| *id).collect();
        for id in ids {
            mounted.detach(id);
        }
        unmounted
    }

    pub fn is_mounted(&self, container_id: &str) -> bool {
        self.hosts.contains_key(container_id)
    }

    pub fn host(&self, container_id: &str) -> Option<&GameHost> {
        self.hosts.get(container_id).map(|m| &m.host)
    }

    pub fn host_mut(&mut self, container_id: &str) -> Option<&mut GameHost> {
        self.hosts.get_mut(container_id).map(|m| &mut m.host)
    }

    /// Advance every mounted game by one display frame.
    pub fn tick(&mut self, dt: f32) {
        for mounted in self.hosts.values_mut() {
            mounted.host.tick(dt);
        }
    }

    pub fn take_asset_requests(&self, container_id: &str) -> Vec<AssetRequest> {
        self.hosts
            .get(container_id)
            .map(|m| m.assets.take_requests())
            .unwrap_or_default()
    }

    pub fn asset_loaded(&self, container_id: &str, key: &str, path: &str, width: u32, height: u32) {
        match self.hosts.get(container_id) {
            Some(mounted) => mounted.assets.loaded(key, path, width, height),
            None => log::warn!("Asset {} loaded for unknown container {}", key, container_id),
        }
    }

    pub fn asset_failed(&self, container_id: &str, key: &str, path: &str, reason: &str) {
        match self.hosts.get(container_id) {
            Some(mounted) => mounted.assets.failed(key, path, reason),
            None => log::warn!("Asset {} failed for unknown container {}", key, container_id),
        }
    }

    /// Named-button press through a container's host. Unknown names are ignored.
    pub fn press_button(&mut self, container_id: &str, name: &str, pressed: bool) -> bool {
        let Some(button) = parse_button(name) else {
            return false;
        };
        match self.host_mut(container_id) {
            Some(host) if pressed => host.press_button(button),
            Some(host) => host.release_button(button),
            None => false,
        }
    }

    /// Press a button on the on-screen widget of `container_id`.
    pub fn widget_press(&mut self, container_id: &str, name: &str) -> bool {
        let Some(button) = parse_button(name) else {
            return false;
        };
        match self.hosts.get_mut(container_id) {
            Some(mounted) => {
                mounted.widget.press(button);
                true
            }
            None => false,
        }
    }

    pub fn widget_release(&mut self, container_id: &str, name: &str) -> bool {
        let Some(button) = parse_button(name) else {
            return false;
        };
        match self.hosts.get_mut(container_id) {
            Some(mounted) => {
                mounted.widget.release(button);
                true
            }
            None => false,
        }
    }

    /// Advance every widget's debounce windows. Returns how many buttons auto-released.
    pub fn widget_tick(&mut self, dt: f32) -> usize {
        self.hosts.values_mut().map(|m| m.widget.tick(dt)).sum()
    }

    /// Register a page listener on the channel with wire name `name`, on every mounted
    /// container and on any mounted later.
    pub fn listen(
        &mut self,
        name: &str,
        callback: impl Fn(&str, &BridgeEvent) -> anyhow::Result<()> + 'static,
    ) -> Option<u32> {
        let Some(kind) = EventKind::from_name(name) else {
            log::warn!("Unknown bridge event {:?}", name);
            return None;
        };
        let listener = Listener { kind, callback: Rc::new(callback) };
        let id = self.next_listener;
        self.next_listener += 1;
        for (container_id, mounted) in self.hosts.iter_mut() {
            mounted.attach(container_id, id, &listener);
        }
        self.listeners.insert(id, listener);
        Some(id)
    }

    pub fn unlisten(&mut self, id: u32) -> bool {
        if self.listeners.remove(&id).is_none() {
            return false;
        }
        for mounted in self.hosts.values_mut() {
            mounted.detach(id);
        }
        true
    }
}

fn parse_button(name: &str) -> Option<Button> {
    let button = Button::parse(name);
    if button.is_none() {
        log::warn!("Unknown button {:?}", name);
    }
    button
}
