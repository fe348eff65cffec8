//! Loading stage: requests every texture in the manifest, reports progress over the
//! bridge, and hands over to gameplay once everything has settled.
//!
//! Handing over is guaranteed. A hard timeout forces the switch when loads hang, and a
//! latch makes sure only the first of the two paths switches.

use std::collections::HashMap;

use crate::api::context::{EngineContext, LoadingText};
use crate::assets::manifest::AssetManifest;
use crate::assets::registry::{LoadedAssets, RenderScheme, SpriteRegistry};
use crate::assets::source::{AssetOutcome, AssetRequest, AssetSource};
use crate::bridge::BridgeEvent;
use crate::core::stage::{Stage, StageFlow, StageKind};
use crate::core::time::Timer;
use crate::input::state::InputState;

const TITLE: &str = "MARIO";
const MAX_DOTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadState {
    Requested { path: String, fallback: bool },
    Loaded { fallback: bool },
    Failed,
}

impl LoadState {
    fn is_settled(&self) -> bool {
        !matches!(self, LoadState::Requested { .. })
    }
}

pub struct PreloadStage {
    source: Box<dyn AssetSource>,
    manifest: AssetManifest,
    loads: HashMap<String, LoadState>,
    last_progress: Option<u8>,
    loaded_signalled: bool,
    settle: Option<Timer>,
    timeout: Timer,
    blink: Timer,
    dots: usize,
    /// Set by whichever of settle/timeout hands over first.
    transitioned: bool,
}

impl PreloadStage {
    pub fn new(source: Box<dyn AssetSource>, manifest: AssetManifest) -> Self {
        Self {
            source,
            manifest,
            loads: HashMap::new(),
            last_progress: None,
            loaded_signalled: false,
            settle: None,
            timeout: Timer::once(0.0),
            blink: Timer::repeating(0.0),
            dots: 0,
            transitioned: false,
        }
    }

    fn total(&self) -> usize {
        self.manifest.texture_count()
    }

    fn settled(&self) -> usize {
        self.loads.values().filter(|s| s.is_settled()).count()
    }

    /// Whole percent of settled textures. An empty manifest is complete.
    pub fn progress(&self) -> u8 {
        let total = self.total();
        if total == 0 {
            return 100;
        }
        ((self.settled() as f32 / total as f32) * 100.0).round() as u8
    }

    pub fn has_transitioned(&self) -> bool {
        self.transitioned
    }

    fn request(&mut self, key: &str, path: &str, fallback: bool) {
        self.source.request(&AssetRequest {
            key: key.to_string(),
            path: path.to_string(),
        });
        self.loads.insert(
            key.to_string(),
            LoadState::Requested { path: path.to_string(), fallback },
        );
    }

    fn apply(&mut self, outcome: AssetOutcome) {
        let Some(LoadState::Requested { path, fallback }) = self.loads.get(&outcome.key).cloned() else {
            log::debug!("Ignoring late or unknown asset outcome for {}", outcome.key);
            return;
        };
        if outcome.path != path {
            log::debug!(
                "Ignoring stale outcome for {} from {}; waiting on {}",
                outcome.key, outcome.path, path
            );
            return;
        }

        match outcome.result {
            Ok(info) => {
                log::debug!(
                    "Loaded {} from {} ({}x{})",
                    outcome.key, outcome.path, info.width, info.height
                );
                self.loads.insert(outcome.key, LoadState::Loaded { fallback });
            }
            Err(err) => {
                log::warn!("Failed to load {} from {}: {:#}", outcome.key, outcome.path, err);
                let retry = if fallback {
                    None
                } else {
                    self.manifest
                        .atlases
                        .iter()
                        .find(|a| a.name == outcome.key)
                        .and_then(|a| a.fallback_path.clone())
                };
                match retry {
                    Some(path) => {
                        log::info!("Retrying {} with fallback {}", outcome.key, path);
                        self.request(&outcome.key, &path, true);
                    }
                    None => {
                        self.loads.insert(outcome.key, LoadState::Failed);
                    }
                }
            }
        }
    }

    /// Sprites need every atlas; one missing atlas means placeholders.
    fn scheme(&self) -> RenderScheme {
        if self.manifest.atlases.is_empty() {
            return RenderScheme::Placeholder;
        }
        let mut scheme = RenderScheme::Atlas;
        for atlas in &self.manifest.atlases {
            match self.loads.get(&atlas.name) {
                Some(LoadState::Loaded { fallback: false }) => {}
                Some(LoadState::Loaded { fallback: true }) => scheme = RenderScheme::FallbackAtlas,
                _ => return RenderScheme::Placeholder,
            }
        }
        scheme
    }

    fn set_status(ctx: &mut EngineContext, status: String) {
        if let Some(text) = ctx.loading.as_mut() {
            text.status = status;
        }
    }

    fn finish(&mut self, ctx: &mut EngineContext, forced: bool) -> StageFlow {
        if self.transitioned {
            return StageFlow::Continue;
        }
        self.transitioned = true;
        self.settle = None;
        self.timeout.cancel();

        let scheme = self.scheme();
        if forced {
            log::warn!(
                "Asset loading timed out at {}%; continuing with {} rendering",
                self.progress(),
                scheme.as_str()
            );
        } else {
            log::info!("Assets ready; rendering with {}", scheme.as_str());
        }
        ctx.assets = LoadedAssets {
            scheme,
            registry: SpriteRegistry::from_manifest(&self.manifest),
        };
        StageFlow::Transition(StageKind::Main)
    }
}

impl Stage for PreloadStage {
    fn kind(&self) -> StageKind {
        StageKind::Preload
    }

    fn setup(&mut self, ctx: &mut EngineContext) {
        self.loads.clear();
        self.last_progress = None;
        self.loaded_signalled = false;
        self.settle = None;
        self.transitioned = false;
        self.timeout = Timer::once(ctx.config.load_timeout);
        self.blink = Timer::repeating(ctx.config.label_blink);
        self.dots = 0;

        ctx.reset_scene();
        ctx.loading = Some(LoadingText {
            title: TITLE.to_string(),
            status: "Loading... 0%".to_string(),
        });

        ctx.emit(BridgeEvent::AssetsLoading);

        let atlases: Vec<(String, String)> = self
            .manifest
            .atlases
            .iter()
            .map(|a| (a.name.clone(), a.path.clone()))
            .collect();
        let images: Vec<(String, String)> = self
            .manifest
            .images
            .iter()
            .map(|i| (i.name.clone(), i.path.clone()))
            .collect();
        for (key, path) in atlases.iter().chain(images.iter()) {
            self.request(key, path, false);
        }
        log::info!("Preload requested {} textures", self.total());
    }

    fn update(&mut self, ctx: &mut EngineContext, _input: &mut InputState) -> StageFlow {
        if self.transitioned {
            return StageFlow::Continue;
        }
        let dt = ctx.config.fixed_dt;

        if self.blink.tick(dt) {
            self.dots = (self.dots + 1) % (MAX_DOTS + 1);
            if let Some(text) = ctx.loading.as_mut() {
                text.title = format!("{}{}", TITLE, ".".repeat(self.dots));
            }
        }

        for outcome in self.source.poll() {
            self.apply(outcome);
        }

        let progress = self.progress();
        if self.last_progress != Some(progress) {
            self.last_progress = Some(progress);
            Self::set_status(ctx, format!("Loading... {}%", progress));
            ctx.emit(BridgeEvent::LoadingProgress(progress));
        }

        if !self.loaded_signalled && self.settled() == self.total() {
            self.loaded_signalled = true;
            Self::set_status(ctx, "Ready!".to_string());
            ctx.emit(BridgeEvent::AssetsLoaded);
            self.settle = Some(Timer::once(ctx.config.settle_delay));
        }

        if self.settle.as_mut().is_some_and(|t| t.tick(dt)) {
            return self.finish(ctx, false);
        }

        if self.timeout.tick(dt) {
            return self.finish(ctx, true);
        }

        StageFlow::Continue
    }

    fn teardown(&mut self, ctx: &mut EngineContext) {
        self.timeout.cancel();
        self.blink.cancel();
        self.settle = None;
        ctx.loading = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::config::GameConfig;
    use crate::assets::source::{AssetQueueHandle, QueuedAssetSource};
    use crate::bridge::{handler, EventBridge, EventKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Harness {
        stage: PreloadStage,
        ctx: EngineContext,
        input: InputState,
        assets: AssetQueueHandle,
        events: Rc<RefCell<Vec<BridgeEvent>>>,
    }

    impl Harness {
        fn new(manifest: AssetManifest) -> Self {
            let bridge = EventBridge::new();
            let events = Rc::new(RefCell::new(Vec::new()));
            for kind in EventKind::ALL {
                let events = events.clone();
                bridge.subscribe(kind, handler(move |e| {
                    events.borrow_mut().push(e.clone());
                    Ok(())
                }));
            }
            let source = QueuedAssetSource::new();
            let assets = source.handle();
            let mut ctx = EngineContext::new(GameConfig::default(), bridge);
            let mut stage = PreloadStage::new(Box::new(source), manifest);
            stage.setup(&mut ctx);
            Self { stage, ctx, input: InputState::new(), assets, events }
        }

        fn step(&mut self) -> StageFlow {
            self.stage.update(&mut self.ctx, &mut self.input)
        }

        /// Step for `seconds`, returning every non-Continue flow seen.
        fn run(&mut self, seconds: f32) -> Vec<StageFlow> {
            let frames = (seconds / self.ctx.config.fixed_dt).round() as usize;
            (0..frames)
                .map(|_| self.step())
                .filter(|f| *f != StageFlow::Continue)
                .collect()
        }

        fn count(&self, kind: EventKind) -> usize {
            self.events.borrow().iter().filter(|e| e.kind() == kind).count()
        }

        fn progress_values(&self) -> Vec<u8> {
            self.events
                .borrow()
                .iter()
                .filter_map(|e| match e {
                    BridgeEvent::LoadingProgress(p) => Some(*p),
                    _ => None,
                })
                .collect()
        }
    }

    #[test]
    fn setup_requests_every_texture() {
        let h = Harness::new(AssetManifest::builtin());
        let requests = h.assets.take_requests();
        let keys: Vec<_> = requests.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["mario-atlas", "ground-tile"]);
        assert!(requests[0].path.ends_with(".svg"));
        assert_eq!(h.count(EventKind::AssetsLoading), 1);
        assert_eq!(h.ctx.loading.as_ref().unwrap().title, "MARIO");
    }

    #[test]
    fn completion_signals_once_then_transitions_once() {
        let mut h = Harness::new(AssetManifest::builtin());
        h.step();
        h.assets.loaded("mario-atlas", "/assets/sprites/mario-atlas.svg", 64, 32);
        h.step();
        h.assets.loaded("ground-tile", "/assets/sprites/mario-atlas.svg", 64, 32);
        h.step();

        assert_eq!(h.progress_values(), vec![0, 50, 100]);
        assert_eq!(h.count(EventKind::AssetsLoaded), 1);
        assert_eq!(h.ctx.loading.as_ref().unwrap().status, "Ready!");

        // Settle delay, then a single hand-over even though the timeout passes later.
        let flows = h.run(0.45);
        assert!(flows.is_empty());
        let flows = h.run(10.0);
        assert_eq!(flows, vec![StageFlow::Transition(StageKind::Main)]);
        assert!(h.stage.has_transitioned());
        assert_eq!(h.count(EventKind::AssetsLoaded), 1);
        assert_eq!(h.ctx.assets.scheme, RenderScheme::Atlas);
    }

    #[test]
    fn failed_svg_falls_back_to_png() {
        let mut h = Harness::new(AssetManifest::builtin());
        h.assets.take_requests();
        h.assets.failed("mario-atlas", "/assets/sprites/mario-atlas.svg", "unsupported");
        h.step();

        let retry = h.assets.take_requests();
        assert_eq!(retry.len(), 1);
        assert!(retry[0].path.ends_with(".png"));
        assert_eq!(h.stage.progress(), 0);

        h.assets.loaded("mario-atlas", &retry[0].path, 64, 32);
        h.assets.loaded("ground-tile", "/assets/sprites/mario-atlas.svg", 64, 32);
        h.step();
        h.run(1.0);
        assert_eq!(h.ctx.assets.scheme, RenderScheme::FallbackAtlas);
    }

    #[test]
    fn stale_primary_failure_does_not_fail_the_retry() {
        let mut h = Harness::new(AssetManifest::builtin());
        h.assets.take_requests();
        h.assets.failed("mario-atlas", "/assets/sprites/mario-atlas.svg", "unsupported");
        h.step();
        let retry = h.assets.take_requests();
        assert_eq!(retry[0].path, "/assets/sprites/mario-atlas.png");

        // The primary's failure reported a second time, after the retry went out.
        h.assets.failed("mario-atlas", "/assets/sprites/mario-atlas.svg", "unsupported");
        h.step();
        assert_eq!(h.stage.progress(), 0);
        assert!(h.assets.take_requests().is_empty());

        h.assets.loaded("mario-atlas", "/assets/sprites/mario-atlas.png", 64, 32);
        h.assets.loaded("ground-tile", "/assets/sprites/mario-atlas.svg", 64, 32);
        h.step();
        h.run(1.0);
        assert_eq!(h.ctx.assets.scheme, RenderScheme::FallbackAtlas);
    }

    #[test]
    fn every_failure_still_reaches_gameplay_with_placeholders() {
        let mut h = Harness::new(AssetManifest::builtin());
        h.assets.failed("mario-atlas", "/assets/sprites/mario-atlas.svg", "404");
        h.assets.failed("ground-tile", "/assets/sprites/mario-atlas.svg", "404");
        h.step();
        h.assets.failed("mario-atlas", "/assets/sprites/mario-atlas.png", "404");
        let flows = h.run(1.0);

        assert_eq!(flows, vec![StageFlow::Transition(StageKind::Main)]);
        assert_eq!(h.progress_values().last(), Some(&100));
        assert_eq!(h.ctx.assets.scheme, RenderScheme::Placeholder);
    }

    #[test]
    fn hung_loads_are_forced_through_by_the_timeout() {
        let mut h = Harness::new(AssetManifest::builtin());
        let flows = h.run(4.9);
        assert!(flows.is_empty());
        let flows = h.run(0.2);
        assert_eq!(flows, vec![StageFlow::Transition(StageKind::Main)]);
        assert_eq!(h.count(EventKind::AssetsLoaded), 0);
        assert_eq!(h.ctx.assets.scheme, RenderScheme::Placeholder);

        // A load landing after the forced hand-over changes nothing.
        h.assets.loaded("mario-atlas", "/assets/sprites/mario-atlas.svg", 64, 32);
        assert!(h.run(1.0).is_empty());
    }

    #[test]
    fn empty_manifest_completes_immediately() {
        let mut h = Harness::new(AssetManifest::default());
        h.step();
        assert_eq!(h.progress_values(), vec![100]);
        assert_eq!(h.count(EventKind::AssetsLoaded), 1);
    }

    #[test]
    fn title_blinks_dots_and_wraps() {
        let mut h = Harness::new(AssetManifest::builtin());
        let mut titles = Vec::new();
        for _ in 0..4 {
            h.run(0.5);
            titles.push(h.ctx.loading.as_ref().unwrap().title.clone());
        }
        assert_eq!(titles, vec!["MARIO.", "MARIO..", "MARIO...", "MARIO"]);
    }

    #[test]
    fn teardown_removes_loading_text() {
        let mut h = Harness::new(AssetManifest::builtin());
        h.stage.teardown(&mut h.ctx);
        assert!(h.ctx.loading.is_none());
    }
}
