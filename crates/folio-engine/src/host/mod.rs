//! Binds one game instance to one container on the hosting page.
//!
//! The host creates the instance on mount and destroys it on unmount, turns touches and
//! named buttons into engine input, and listens on the bridge to keep the page's loading
//! overlay, navigation and screen-reader announcements in step with the game.

use std::cell::RefCell;
use std::rc::Rc;

use crate::api::config::GameConfig;
use crate::api::types::{Button, ContentType};
use crate::assets::manifest::AssetManifest;
use crate::assets::source::AssetSource;
use crate::bridge::{handler, BridgeEvent, EventBridge, EventKind, Handler};
use crate::core::stage::StageKind;
use crate::input::queue::InputEvent;
use crate::instance::GameInstance;

const START_MESSAGE: &str = "Mario game loaded. Use arrow keys or WASD to move, spacebar or A button to jump. Hit colored boxes to navigate to different sections.";
const JUMP_MESSAGE: &str = "Mario jumped";

/// The page element the game draws into.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: String,
    pub width: f32,
    pub height: f32,
}

impl Container {
    pub fn new(id: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }
}

/// How urgently a screen reader should speak an announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Polite,
    Assertive,
}

impl Priority {
    /// Value for the page's `aria-live` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Polite => "polite",
            Priority::Assertive => "assertive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub message: String,
    pub priority: Priority,
}

impl Announcement {
    fn new(message: impl Into<String>, priority: Priority) -> Self {
        Self {
            message: message.into(),
            priority,
        }
    }
}

/// What the page should be showing around the game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostView {
    pub loading_visible: bool,
    pub progress: u8,
    pub last_scene: Option<StageKind>,
}

impl Default for HostView {
    fn default() -> Self {
        Self {
            loading_visible: true,
            progress: 0,
            last_scene: None,
        }
    }
}

pub type Navigate = Rc<dyn Fn(ContentType)>;
pub type Announcer = Rc<dyn Fn(&Announcement)>;

pub struct GameHost {
    bridge: EventBridge,
    container: Container,
    config: GameConfig,
    manifest: AssetManifest,
    navigate: Navigate,
    announcer: Option<Announcer>,
    view: Rc<RefCell<HostView>>,
    subscriptions: Vec<(EventKind, Handler)>,
    instance: Option<GameInstance>,
    /// Buttons the current touch is holding down.
    touch_held: Vec<Button>,
}

impl GameHost {
    pub fn new(
        bridge: EventBridge,
        container: Container,
        config: GameConfig,
        navigate: impl Fn(ContentType) + 'static,
    ) -> Self {
        Self {
            bridge,
            container,
            config,
            manifest: AssetManifest::builtin(),
            navigate: Rc::new(navigate),
            announcer: None,
            view: Rc::new(RefCell::new(HostView::default())),
            subscriptions: Vec::new(),
            instance: None,
            touch_held: Vec::new(),
        }
    }

    pub fn with_announcer(mut self, announce: impl Fn(&Announcement) + 'static) -> Self {
        self.announcer = Some(Rc::new(announce));
        self
    }

    /// Replace the compiled-in asset manifest. Applies from the next mount.
    pub fn with_manifest(mut self, manifest: AssetManifest) -> Self {
        self.manifest = manifest;
        self
    }

    /// Create the game instance. Refused while one is already live for this container.
    pub fn mount(&mut self, assets: Box<dyn AssetSource>) -> bool {
        if self.instance.is_some() {
            log::warn!("Container {} already has a live game; ignoring mount", self.container.id);
            return false;
        }

        *self.view.borrow_mut() = HostView::default();
        self.subscribe_all();
        self.instance = Some(GameInstance::new(
            self.config.clone(),
            self.bridge.clone(),
            assets,
            self.manifest.clone(),
        ));
        log::info!(
            "Mounted game in {} ({}x{})",
            self.container.id,
            self.container.width,
            self.container.height
        );
        true
    }

    /// Unsubscribe everything this host registered, then destroy the instance.
    /// Returns false when nothing was mounted.
    pub fn unmount(&mut self) -> bool {
        let Some(mut instance) = self.instance.take() else {
            return false;
        };
        self.unsubscribe_all();
        self.touch_held.clear();
        instance.destroy();
        *self.view.borrow_mut() = HostView::default();
        log::info!("Unmounted game from {}", self.container.id);
        true
    }

    /// Tear down the live instance, if any, and start a fresh one.
    pub fn remount(&mut self, assets: Box<dyn AssetSource>) -> bool {
        self.unmount();
        self.mount(assets)
    }

    pub fn is_mounted(&self) -> bool {
        self.instance.is_some()
    }

    pub fn tick(&mut self, dt: f32) {
        if let Some(instance) = self.instance.as_mut() {
            instance.tick(dt);
        }
    }

    /// Forward a physical key (browser `keyCode`).
    pub fn push_key(&mut self, key_code: u32, down: bool) {
        let event = if down {
            InputEvent::KeyDown { key_code }
        } else {
            InputEvent::KeyUp { key_code }
        };
        self.push(event);
    }

    /// Hold a named button and republish the press for other listeners.
    pub fn press_button(&mut self, button: Button) -> bool {
        if !self.push(InputEvent::ButtonDown(button)) {
            return false;
        }
        self.bridge.publish(BridgeEvent::ButtonPressed { button, pressed: true });
        true
    }

    pub fn release_button(&mut self, button: Button) -> bool {
        if !self.push(InputEvent::ButtonUp(button)) {
            return false;
        }
        self.bridge.publish(BridgeEvent::ButtonPressed { button, pressed: false });
        true
    }

    /// Map a touch at container coordinates onto buttons: the left and right thirds
    /// steer, the upper half jumps. Held until [`GameHost::touch_end`].
    pub fn touch_start(&mut self, x: f32, y: f32) {
        if self.instance.is_none() {
            return;
        }
        self.touch_end();

        let Container { width, height, .. } = self.container;
        if x < width / 3.0 {
            self.touch_held.push(Button::Left);
        } else if x > width * 2.0 / 3.0 {
            self.touch_held.push(Button::Right);
        }
        if y < height / 2.0 {
            self.touch_held.push(Button::A);
        }

        for button in self.touch_held.clone() {
            self.press_button(button);
        }
    }

    pub fn touch_end(&mut self) {
        for button in std::mem::take(&mut self.touch_held) {
            self.release_button(button);
        }
    }

    pub fn view(&self) -> HostView {
        self.view.borrow().clone()
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn instance(&self) -> Option<&GameInstance> {
        self.instance.as_ref()
    }

    fn push(&mut self, event: InputEvent) -> bool {
        match self.instance.as_mut() {
            Some(instance) => {
                instance.push_input(event);
                true
            }
            None => false,
        }
    }

    fn subscribe(&mut self, kind: EventKind, h: Handler) {
        self.bridge.subscribe(kind, h.clone());
        self.subscriptions.push((kind, h));
    }

    fn subscribe_all(&mut self) {
        let announce = {
            let announcer = self.announcer.clone();
            move |announcement: Announcement| {
                if let Some(announcer) = &announcer {
                    announcer(&announcement);
                }
            }
        };
        let announce = Rc::new(announce);

        {
            let view = self.view.clone();
            let announce = announce.clone();
            self.subscribe(EventKind::GameReady, handler(move |_| {
                view.borrow_mut().loading_visible = false;
                announce(Announcement::new(START_MESSAGE, Priority::Assertive));
                Ok(())
            }));
        }
        {
            let view = self.view.clone();
            self.subscribe(EventKind::SceneReady, handler(move |event| {
                if let BridgeEvent::SceneReady { stage } = event {
                    log::info!("Scene ready: {}", stage.as_str());
                    view.borrow_mut().last_scene = Some(*stage);
                }
                Ok(())
            }));
        }
        {
            let navigate = self.navigate.clone();
            let announce = announce.clone();
            self.subscribe(EventKind::ContentTrigger, handler(move |event| {
                if let BridgeEvent::ContentTrigger(content) = event {
                    log::info!("Content triggered: {}", content.as_str());
                    navigate(*content);
                    announce(Announcement::new(
                        format!("Navigating to {} section", content.section_name()),
                        Priority::Assertive,
                    ));
                }
                Ok(())
            }));
        }
        {
            let view = self.view.clone();
            self.subscribe(EventKind::LoadingProgress, handler(move |event| {
                if let BridgeEvent::LoadingProgress(percent) = event {
                    let mut view = view.borrow_mut();
                    view.progress = view.progress.max(*percent);
                }
                Ok(())
            }));
        }
        self.subscribe(EventKind::BoxHit, handler(|event| {
            if let BridgeEvent::BoxHit { content, .. } = event {
                log::debug!("Box hit: {}", content.as_str());
            }
            Ok(())
        }));
        self.subscribe(EventKind::PlayerJumped, handler(move |_| {
            announce(Announcement::new(JUMP_MESSAGE, Priority::Polite));
            Ok(())
        }));
    }

    fn unsubscribe_all(&mut self) {
        for (kind, h) in self.subscriptions.drain(..) {
            self.bridge.unsubscribe(kind, &h);
        }
    }
}

impl Drop for GameHost {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::source::{AssetQueueHandle, QueuedAssetSource};
    use crate::input::virtual_buttons::VirtualButtons;
    use glam::Vec2;

    const FRAME: f32 = 1.0 / 60.0;

    struct Page {
        bridge: EventBridge,
        host: GameHost,
        navigated: Rc<RefCell<Vec<ContentType>>>,
        spoken: Rc<RefCell<Vec<Announcement>>>,
    }

    impl Page {
        fn new() -> Self {
            let bridge = EventBridge::new();
            let navigated = Rc::new(RefCell::new(Vec::new()));
            let spoken = Rc::new(RefCell::new(Vec::new()));
            let host = {
                let navigated = navigated.clone();
                let spoken = spoken.clone();
                GameHost::new(
                    bridge.clone(),
                    Container::new("game", 256.0, 192.0),
                    GameConfig::default(),
                    move |content| navigated.borrow_mut().push(content),
                )
                .with_announcer(move |a| spoken.borrow_mut().push(a.clone()))
            };
            Self { bridge, host, navigated, spoken }
        }

        fn mount(&mut self) -> AssetQueueHandle {
            let source = QueuedAssetSource::new();
            let handle = source.handle();
            assert!(self.host.mount(Box::new(source)));
            handle
        }

        /// Mount, resolve every asset and run until gameplay is up.
        fn play(&mut self) {
            let handle = self.mount();
            self.host.tick(FRAME);
            for request in handle.take_requests() {
                handle.loaded(&request.key, &request.path, 64, 32);
            }
            self.run(1.5);
            assert_eq!(self.stage(), Some(StageKind::Main));
        }

        fn run(&mut self, seconds: f32) {
            for _ in 0..(seconds / FRAME).round() as usize {
                self.host.tick(FRAME);
            }
        }

        fn stage(&self) -> Option<StageKind> {
            self.host.instance().and_then(GameInstance::active_stage)
        }

        fn player_pos(&self) -> Vec2 {
            let instance = self.host.instance().expect("mounted");
            instance.context().scene.find_by_tag("player").expect("player").pos
        }
    }

    #[test]
    fn mount_twice_is_refused() {
        let mut page = Page::new();
        page.mount();
        let source = QueuedAssetSource::new();
        assert!(!page.host.mount(Box::new(source)));
        assert!(page.host.is_mounted());
    }

    #[test]
    fn loading_overlay_follows_progress_and_ready() {
        let mut page = Page::new();
        let handle = page.mount();
        page.host.tick(FRAME);
        let view = page.host.view();
        assert!(view.loading_visible);
        assert_eq!(view.progress, 0);

        let requests = handle.take_requests();
        handle.loaded(&requests[0].key, &requests[0].path, 64, 32);
        page.host.tick(FRAME);
        assert_eq!(page.host.view().progress, 50);

        handle.loaded(&requests[1].key, &requests[1].path, 16, 16);
        page.run(1.0);
        let view = page.host.view();
        assert!(!view.loading_visible);
        assert_eq!(view.progress, 100);
        assert_eq!(view.last_scene, Some(StageKind::Main));
        assert_eq!(page.spoken.borrow()[0].priority, Priority::Assertive);
        assert!(page.spoken.borrow()[0].message.starts_with("Mario game loaded"));
    }

    #[test]
    fn content_trigger_navigates_and_announces() {
        let mut page = Page::new();
        page.play();
        page.bridge.publish(BridgeEvent::ContentTrigger(ContentType::Portfolio));
        assert_eq!(*page.navigated.borrow(), vec![ContentType::Portfolio]);
        let last = page.spoken.borrow().last().cloned().expect("announced");
        assert_eq!(last.message, "Navigating to Portfolio section");
        assert_eq!(last.priority, Priority::Assertive);
    }

    #[test]
    fn unmount_unsubscribes_before_destroying() {
        let mut page = Page::new();
        page.play();
        assert!(page.bridge.handler_count(EventKind::ContentTrigger) > 0);

        let destroyed_seen = Rc::new(RefCell::new(None));
        {
            let bridge = page.bridge.clone();
            let seen = destroyed_seen.clone();
            page.bridge.subscribe(EventKind::GameDestroyed, handler(move |_| {
                *seen.borrow_mut() = Some(bridge.handler_count(EventKind::GameReady));
                Ok(())
            }));
        }

        assert!(page.host.unmount());
        assert_eq!(*destroyed_seen.borrow(), Some(0));
        assert_eq!(page.bridge.handler_count(EventKind::ContentTrigger), 0);
        assert_eq!(page.bridge.handler_count(EventKind::DpadLeft), 0);
        assert!(!page.host.is_mounted());
        assert!(!page.host.unmount());

        page.bridge.publish(BridgeEvent::ContentTrigger(ContentType::Resume));
        assert!(page.navigated.borrow().is_empty());
    }

    #[test]
    fn remount_replaces_the_instance() {
        let mut page = Page::new();
        page.play();
        let source = QueuedAssetSource::new();
        assert!(page.host.remount(Box::new(source)));
        assert_eq!(page.stage(), Some(StageKind::Preload));
        assert_eq!(page.bridge.handler_count(EventKind::GameReady), 1);
        assert!(page.host.view().loading_visible);
    }

    #[test]
    fn input_without_instance_is_dropped() {
        let mut page = Page::new();
        assert!(!page.host.press_button(Button::A));
        page.host.touch_start(10.0, 10.0);
        page.host.tick(FRAME);
        assert!(!page.host.is_mounted());
    }

    #[test]
    fn pressing_a_named_button_republishes_it() {
        let mut page = Page::new();
        page.play();
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = seen.clone();
            page.bridge.subscribe(EventKind::ButtonPressed, handler(move |e| {
                seen.borrow_mut().push(e.payload());
                Ok(())
            }));
        }
        page.host.press_button(Button::Right);
        page.host.release_button(Button::Right);
        assert_eq!(
            *seen.borrow(),
            vec![
                serde_json::json!({ "button": "right", "pressed": true }),
                serde_json::json!({ "button": "right", "pressed": false }),
            ]
        );
    }

    #[test]
    fn touch_in_right_third_walks_right_until_released() {
        let mut page = Page::new();
        page.play();
        let start = page.player_pos();

        // Lower half: steer without jumping.
        page.host.touch_start(250.0, 150.0);
        page.run(0.25);
        let moved = page.player_pos();
        assert!(moved.x > start.x + 10.0);

        page.host.touch_end();
        page.run(0.5);
        let settled = page.player_pos();
        page.run(0.25);
        assert!((page.player_pos().x - settled.x).abs() < 0.01);
    }

    #[test]
    fn touch_in_upper_half_jumps() {
        let mut page = Page::new();
        page.play();
        page.spoken.borrow_mut().clear();

        page.host.touch_start(128.0, 20.0);
        page.host.tick(FRAME);
        page.host.touch_end();
        assert_eq!(
            *page.spoken.borrow(),
            vec![Announcement::new(JUMP_MESSAGE, Priority::Polite)]
        );
    }

    #[test]
    fn widget_a_press_jumps_and_auto_releases() {
        let mut page = Page::new();
        page.play();
        let releases = Rc::new(RefCell::new(0));
        {
            let releases = releases.clone();
            page.bridge.subscribe(EventKind::GameboyButtonRelease, handler(move |_| {
                *releases.borrow_mut() += 1;
                Ok(())
            }));
        }
        let mut widget = VirtualButtons::new(page.bridge.clone(), 0.15);
        let ground_y = page.player_pos().y;

        widget.press(Button::A);
        page.host.tick(FRAME);
        page.host.tick(FRAME);
        assert!(page.player_pos().y < ground_y);

        for _ in 0..14 {
            assert_eq!(widget.tick(0.01), 0);
        }
        assert_eq!(*releases.borrow(), 0);
        widget.tick(0.02);
        assert_eq!(*releases.borrow(), 1);
        assert!(!widget.is_pressed(Button::A));
    }
}
