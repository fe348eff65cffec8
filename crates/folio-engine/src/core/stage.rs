//! Stages are the top-level modes of a game instance (loading, then playing).
//! The manager owns every registered stage and switches between them.

use crate::api::context::EngineContext;
use crate::input::state::InputState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Preload,
    Main,
}

impl StageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Preload => "preload",
            StageKind::Main => "main",
        }
    }
}

/// What a stage wants after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageFlow {
    Continue,
    Transition(StageKind),
}

pub trait Stage {
    fn kind(&self) -> StageKind;

    /// Build the stage's scene. Must leave the stage runnable even when parts of the
    /// construction fail.
    fn setup(&mut self, ctx: &mut EngineContext);

    /// One fixed step of `ctx.config.fixed_dt` seconds.
    fn update(&mut self, ctx: &mut EngineContext, input: &mut InputState) -> StageFlow;

    /// Release whatever `setup` registered outside the scene.
    fn teardown(&mut self, _ctx: &mut EngineContext) {}
}

pub struct StageManager {
    stages: Vec<Box<dyn Stage>>,
    active: Option<usize>,
    transitions: u32,
}

impl StageManager {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages,
            active: None,
            transitions: 0,
        }
    }

    fn index_of(&self, kind: StageKind) -> Option<usize> {
        self.stages.iter().position(|s| s.kind() == kind)
    }

    /// Set up the first stage. Does nothing if a stage is already running.
    pub fn start(&mut self, kind: StageKind, ctx: &mut EngineContext) -> bool {
        if self.active.is_some() {
            log::warn!("StageManager already running; ignoring start({})", kind.as_str());
            return false;
        }
        let Some(idx) = self.index_of(kind) else {
            log::error!("No stage registered for {}", kind.as_str());
            return false;
        };
        log::info!("Starting stage {}", kind.as_str());
        self.stages[idx].setup(ctx);
        self.active = Some(idx);
        true
    }

    /// Tear down the active stage and set up `kind`.
    /// Switching to the stage that is already active is refused.
    pub fn transition_to(&mut self, kind: StageKind, ctx: &mut EngineContext) -> bool {
        let Some(next) = self.index_of(kind) else {
            log::error!("No stage registered for {}", kind.as_str());
            return false;
        };
        if self.active == Some(next) {
            log::warn!("Stage {} is already active", kind.as_str());
            return false;
        }
        if let Some(current) = self.active.take() {
            self.stages[current].teardown(ctx);
            log::info!(
                "Stage transition {} -> {}",
                self.stages[current].kind().as_str(),
                kind.as_str()
            );
        }
        self.stages[next].setup(ctx);
        self.active = Some(next);
        self.transitions += 1;
        true
    }

    /// Step the active stage and apply the transition it asks for.
    pub fn update(&mut self, ctx: &mut EngineContext, input: &mut InputState) -> StageFlow {
        let Some(idx) = self.active else {
            return StageFlow::Continue;
        };
        let flow = self.stages[idx].update(ctx, input);
        if let StageFlow::Transition(kind) = flow {
            self.transition_to(kind, ctx);
        }
        flow
    }

    /// Tear down the active stage, leaving none running.
    pub fn shutdown(&mut self, ctx: &mut EngineContext) {
        if let Some(idx) = self.active.take() {
            self.stages[idx].teardown(ctx);
        }
    }

    pub fn active_kind(&self) -> Option<StageKind> {
        self.active.map(|idx| self.stages[idx].kind())
    }

    pub fn transitions(&self) -> u32 {
        self.transitions
    }
}
