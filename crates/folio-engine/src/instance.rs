use crate::api::config::GameConfig;
use crate::api::context::{EngineContext, LoadingText};
use crate::api::types::Theme;
use crate::assets::manifest::AssetManifest;
use crate::assets::source::AssetSource;
use crate::bridge::{BridgeEvent, EventBridge};
use crate::core::stage::{StageKind, StageManager};
use crate::core::time::FixedTimestep;
use crate::input::queue::{InputEvent, InputQueue};
use crate::input::state::InputState;
use crate::renderer::instance::RenderBuffer;
use crate::stages::{GameplayStage, PreloadStage};
use crate::systems::animation::tick_animations;
use crate::systems::render::build_render_buffer;

/// One running game: the stages, their shared context, input, and the render buffer
/// the page reads after every frame.
///
/// Construction starts the Preload stage right away, so the caller should subscribe to
/// the bridge before creating an instance.
pub struct GameInstance {
    ctx: EngineContext,
    stages: StageManager,
    input: InputQueue,
    state: InputState,
    timestep: FixedTimestep,
    render_buffer: RenderBuffer,
    frame: u64,
    destroyed: bool,
}

impl GameInstance {
    pub fn new(
        mut config: GameConfig,
        bridge: EventBridge,
        assets: Box<dyn AssetSource>,
        manifest: AssetManifest,
    ) -> Self {
        // Every timer and the step accumulator divide by this.
        if !(config.fixed_dt > 0.0) {
            log::warn!("Invalid fixed_dt {}; using the default step", config.fixed_dt);
            config.fixed_dt = GameConfig::default().fixed_dt;
        }
        let timestep = FixedTimestep::new(config.fixed_dt);
        let mut ctx = EngineContext::new(config, bridge);
        let mut stages = StageManager::new(vec![
            Box::new(PreloadStage::new(assets, manifest)),
            Box::new(GameplayStage::new()),
        ]);
        stages.start(StageKind::Preload, &mut ctx);

        Self {
            ctx,
            stages,
            input: InputQueue::new(),
            state: InputState::new(),
            timestep,
            render_buffer: RenderBuffer::new(),
            frame: 0,
            destroyed: false,
        }
    }

    /// Queue raw input for the next frame.
    pub fn push_input(&mut self, event: InputEvent) {
        if !self.destroyed {
            self.input.push(event);
        }
    }

    /// Advance by one display frame of `dt` seconds: fold queued input, run as many
    /// fixed steps as the accumulator allows, then rebuild the render buffer.
    pub fn tick(&mut self, dt: f32) {
        if self.destroyed {
            return;
        }

        for event in self.input.drain() {
            self.state.apply(event);
        }

        let steps = self.timestep.accumulate(dt);
        let step_dt = self.timestep.dt();
        for _ in 0..steps {
            self.stages.update(&mut self.ctx, &mut self.state);
            tick_animations(&mut self.ctx.scene, step_dt);
        }

        build_render_buffer(&self.ctx.scene, self.ctx.theme.background(), &mut self.render_buffer);
        self.frame += 1;
    }

    /// Tear down the active stage, release every entity, and announce `game-destroyed`.
    /// Calling it again does nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.stages.shutdown(&mut self.ctx);
        self.ctx.reset_scene();
        self.ctx.loading = None;
        self.input.drain();
        self.state.clear();
        self.render_buffer.clear();
        log::info!("Game instance destroyed after {} frames", self.frame);
        self.ctx.emit(BridgeEvent::GameDestroyed);
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn active_stage(&self) -> Option<StageKind> {
        self.stages.active_kind()
    }

    pub fn stage_transitions(&self) -> u32 {
        self.stages.transitions()
    }

    pub fn loading(&self) -> Option<&LoadingText> {
        self.ctx.loading.as_ref()
    }

    pub fn theme(&self) -> Theme {
        self.ctx.theme
    }

    pub fn render_buffer(&self) -> &RenderBuffer {
        &self.render_buffer
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl Drop for GameInstance {
    fn drop(&mut self) {
        self.destroy();
    }
}
