//! The platformer itself: one player, static platforms, three content boxes, and the
//! area slide at the world edges.
//!
//! Each step runs in a fixed order: tweens, input, horizontal movement, jump, physics,
//! trigger overlap, edge transition, then pose selection. The grounded flag is only
//! ever set by the physics pass of the same step, so walking off a ledge cancels a
//! jump on the very next step.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use anyhow::Context;
use glam::Vec2;

use crate::api::context::EngineContext;
use crate::api::types::{ContentType, EntityId, Facing, Theme};
use crate::bridge::{handler, BridgeEvent, EventKind, Handler};
use crate::components::animation::{AnimationComponent, AnimationDef, Pose};
use crate::components::entity::Entity;
use crate::components::layer::RenderLayer;
use crate::components::shape::ShapeComponent;
use crate::core::collision::{move_and_collide, Aabb};
use crate::core::stage::{Stage, StageFlow, StageKind};
use crate::extensions::easing::Easing;
use crate::extensions::tween::{Axis, Tween, TweenLoop};
use crate::input::state::{InputState, Intent, VirtualPad};

/// Done tag of the area slide tween.
const AREA_SLIDE_DONE: u32 = 1;

const PLAYER_TAG: &str = "player";
const BOX_TAG: &str = "content-box";
const TERRAIN_TAG: &str = "terrain";
const PLACEHOLDER_PLAYER: u32 = 0xff0000;

/// Bridge channels the virtual pad listens on.
const PAD_CHANNELS: [EventKind; 4] = [
    EventKind::DpadLeft,
    EventKind::DpadRight,
    EventKind::ButtonA,
    EventKind::ButtonB,
];

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub half: Vec2,
    pub grounded: bool,
    pub facing: Facing,
    pub pose: Pose,
}

impl Player {
    fn new(id: EntityId, pos: Vec2, size: Vec2) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            half: size * 0.5,
            grounded: false,
            facing: Facing::Right,
            pose: Pose::Idle,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb {
            center: self.pos,
            half: self.half,
        }
    }
}

/// A box that navigates somewhere when the player runs into it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentTrigger {
    pub id: EntityId,
    pub content: ContentType,
    /// Fixed hit box; the bounce only moves the drawn box.
    pub hitbox: Aabb,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AreaState {
    pub current: u32,
    pub transitioning: bool,
    /// Area being slid into; committed when the slide finishes.
    pub pending: Option<u32>,
}

pub struct GameplayStage {
    player: Player,
    solids: Vec<Aabb>,
    triggers: Vec<ContentTrigger>,
    area: AreaState,
    overlapping: HashSet<EntityId>,
    pad: Rc<RefCell<VirtualPad>>,
    pad_handler: Option<Handler>,
    /// False when scene construction failed; the stage then idles.
    built: bool,
}

impl GameplayStage {
    pub fn new() -> Self {
        Self {
            player: Player::new(EntityId(0), Vec2::ZERO, Vec2::ONE),
            solids: Vec::new(),
            triggers: Vec::new(),
            area: AreaState::default(),
            overlapping: HashSet::new(),
            pad: Rc::new(RefCell::new(VirtualPad::default())),
            pad_handler: None,
            built: false,
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn area(&self) -> AreaState {
        self.area
    }

    pub fn triggers(&self) -> &[ContentTrigger] {
        &self.triggers
    }

    fn subscribe_pad(&mut self, ctx: &EngineContext) {
        let pad = self.pad.clone();
        let h = handler(move |event| {
            pad.borrow_mut().handle(event);
            Ok(())
        });
        for kind in PAD_CHANNELS {
            ctx.bridge.subscribe(kind, h.clone());
        }
        self.pad_handler = Some(h);
    }

    fn unsubscribe_pad(&mut self, ctx: &EngineContext) {
        if let Some(h) = self.pad_handler.take() {
            for kind in PAD_CHANNELS {
                ctx.bridge.unsubscribe(kind, &h);
            }
        }
        self.pad.borrow_mut().clear();
    }

    fn build(&mut self, ctx: &mut EngineContext) -> anyhow::Result<()> {
        ctx.config.validate().context("gameplay config")?;
        self.build_terrain(ctx);
        self.spawn_player(ctx);
        self.spawn_boxes(ctx);
        Ok(())
    }

    fn build_terrain(&mut self, ctx: &mut EngineContext) {
        let config = ctx.config.clone();
        let brown = ShapeComponent::hex(config.ground_color);
        let tile = config.ground_tile;
        let tiles = (config.world_width / tile).ceil() as u32;

        let mut rects: Vec<Aabb> = (0..tiles)
            .map(|i| {
                Aabb::new(
                    Vec2::new(i as f32 * tile + tile / 2.0, config.ground_level + tile / 2.0),
                    Vec2::splat(tile),
                )
            })
            .collect();
        rects.extend(config.platforms.iter().map(|p| Aabb::new(p.center, p.size)));

        for rect in &rects {
            let id = ctx.next_id();
            ctx.scene.spawn(
                Entity::new(id)
                    .with_tag(TERRAIN_TAG)
                    .with_pos(rect.center)
                    .with_scale(rect.size())
                    .with_shape(brown)
                    .with_layer(RenderLayer::Terrain),
            );
        }
        self.solids = rects;
    }

    fn spawn_player(&mut self, ctx: &mut EngineContext) {
        let id = ctx.next_id();
        let size = ctx.config.player_size;
        self.player = Player::new(id, ctx.config.player_spawn, size);

        let mut entity = Entity::new(id)
            .with_tag(PLAYER_TAG)
            .with_pos(self.player.pos)
            .with_scale(size)
            .with_shape(ShapeComponent::hex(PLACEHOLDER_PLAYER))
            .with_layer(RenderLayer::Actors);

        if let Some(sprite) = ctx.assets.sprite("mario-idle") {
            entity = entity.with_sprite(sprite);
            match player_animations(ctx) {
                Some(animation) => entity = entity.with_animation(animation),
                None => log::warn!("Player animation frames missing from the atlas; using a still sprite"),
            }
        }
        ctx.scene.spawn(entity);
    }

    fn spawn_boxes(&mut self, ctx: &mut EngineContext) {
        let config = ctx.config.clone();
        self.triggers.clear();
        for def in &config.content_boxes {
            let id = ctx.next_id();
            let shape = ShapeComponent::hex(def.tint);
            let mut entity = Entity::new(id)
                .with_tag(BOX_TAG)
                .with_pos(def.center)
                .with_scale(config.box_display_size)
                .with_shape(shape)
                .with_layer(RenderLayer::Objects);
            let frame = format!("box-{}", def.content.as_str());
            if let Some(sprite) = ctx.assets.sprite(&frame) {
                let [r, g, b, _] = shape.color;
                entity = entity.with_sprite(sprite.with_tint([r, g, b]));
            }
            ctx.scene.spawn(entity);
            self.triggers.push(ContentTrigger {
                id,
                content: def.content,
                hitbox: Aabb::new(def.center, config.box_hit_size),
            });
        }
    }

    fn apply_horizontal(&mut self, ctx: &EngineContext, direction: i8, dt: f32) {
        let config = &ctx.config;
        let player = &mut self.player;
        if self.area.transitioning {
            player.vel.x = 0.0;
            return;
        }
        match direction {
            d if d < 0 => {
                player.vel.x = -config.player_speed;
                player.facing = Facing::Left;
            }
            d if d > 0 => {
                player.vel.x = config.player_speed;
                player.facing = Facing::Right;
            }
            _ => {
                let friction = if player.grounded {
                    config.ground_friction
                } else {
                    config.air_friction
                };
                let vx = player.vel.x;
                player.vel.x = if vx.abs() < config.friction_snap {
                    0.0
                } else if vx > 0.0 {
                    (vx - friction * dt).max(0.0)
                } else {
                    (vx + friction * dt).min(0.0)
                };
            }
        }
    }

    fn try_jump(&mut self, ctx: &EngineContext) {
        if !self.player.grounded {
            return;
        }
        self.player.vel.y = ctx.config.jump_velocity;
        self.player.grounded = false;
        log::debug!("Player jumped at ({:.1}, {:.1})", self.player.pos.x, self.player.pos.y);
        ctx.emit(BridgeEvent::PlayerJumped);
    }

    fn step_physics(&mut self, ctx: &EngineContext, dt: f32) {
        let config = &ctx.config;
        let player = &mut self.player;

        player.grounded = false;
        player.vel.y += config.gravity * dt;
        let contacts = move_and_collide(&mut player.pos, &mut player.vel, player.half, dt, &self.solids);
        player.grounded = contacts.down;

        // Keep the whole body on screen and above the ground line.
        let min_x = player.half.x;
        let max_x = config.world_width - player.half.x;
        if player.pos.x < min_x || player.pos.x > max_x {
            player.pos.x = player.pos.x.clamp(min_x, max_x);
            player.vel.x = 0.0;
        }
        if player.pos.y < player.half.y {
            player.pos.y = player.half.y;
            player.vel.y = player.vel.y.max(0.0);
        }
        let floor = config.ground_level - player.half.y;
        if player.pos.y > floor {
            player.pos.y = floor;
            player.vel.y = 0.0;
            player.grounded = true;
        }
    }

    fn check_triggers(&mut self, ctx: &mut EngineContext) {
        let body = self.player.bounds();
        let mut now = HashSet::new();
        for trigger in &self.triggers {
            if !body.overlaps(&trigger.hitbox) {
                continue;
            }
            now.insert(trigger.id);
            if self.overlapping.contains(&trigger.id) {
                continue;
            }
            log::debug!("Player hit {} box", trigger.content.as_str());
            bounce(ctx, trigger);
            ctx.emit(BridgeEvent::BoxHit {
                content: trigger.content,
                entity: trigger.id,
            });
            ctx.emit(BridgeEvent::ContentTrigger(trigger.content));
        }
        self.overlapping = now;
    }

    fn check_edges(&mut self, ctx: &mut EngineContext, direction: i8) {
        if self.area.transitioning {
            return;
        }
        let config = &ctx.config;
        let x = self.player.pos.x;
        let (next, target) = if direction < 0 && x <= config.edge_margin {
            if self.area.current == 0 {
                return;
            }
            (self.area.current - 1, config.world_width - config.reentry_inset)
        } else if direction > 0 && x >= config.world_width - config.edge_margin {
            (self.area.current + 1, config.reentry_inset)
        } else {
            return;
        };

        let duration = config.area_tween_duration;
        self.area.transitioning = true;
        self.area.pending = Some(next);
        self.player.vel.x = 0.0;
        ctx.theme = Theme::for_area(next);
        log::info!("Area transition {} -> {} ({})", self.area.current, next, ctx.theme.as_str());

        ctx.tweens.add(
            self.player.id,
            Tween::along(Axis::X, x, target, duration, Easing::QuadInOut).with_done_tag(AREA_SLIDE_DONE),
        );
    }

    fn commit_area(&mut self, ctx: &EngineContext) {
        let Some(area) = self.area.pending.take() else {
            return;
        };
        self.area.current = area;
        self.area.transitioning = false;
        log::info!("Entered area {}", area);
        ctx.emit(BridgeEvent::AreaChanged {
            area,
            theme: Theme::for_area(area),
        });
    }

    fn select_pose(&mut self, ctx: &EngineContext) {
        self.player.pose = if !self.player.grounded {
            Pose::Jump
        } else if self.player.vel.x.abs() > ctx.config.walk_threshold {
            Pose::Walk
        } else {
            Pose::Idle
        };
    }

    fn sync_player_entity(&self, ctx: &mut EngineContext) {
        let Some(entity) = ctx.scene.get_mut(self.player.id) else {
            return;
        };
        entity.pos = self.player.pos;
        if let Some(sprite) = entity.sprite.as_mut() {
            sprite.flip_x = self.player.facing == Facing::Left;
        }
        if let Some(animation) = entity.animation.as_mut() {
            animation.play(self.player.pose);
        }
    }
}

impl Default for GameplayStage {
    fn default() -> Self {
        Self::new()
    }
}

/// Idle, walk and jump sequences from the atlas, if every frame is present.
fn player_animations(ctx: &EngineContext) -> Option<AnimationComponent> {
    let registry = &ctx.assets.registry;
    let idle = registry.frame("mario-idle")?;
    let walk = vec![registry.frame("mario-walk-1")?, registry.frame("mario-walk-2")?];
    let jump = registry.frame("mario-jump")?;

    let mut animation = AnimationComponent::default();
    animation.add(Pose::Idle, AnimationDef::still(idle));
    animation.add(Pose::Walk, AnimationDef::from_frames(walk, ctx.config.walk_fps, true));
    animation.add(Pose::Jump, AnimationDef::still(jump));
    Some(animation)
}

/// Knock the drawn box up and back. A bounce already running is restarted from rest.
fn bounce(ctx: &mut EngineContext, trigger: &ContentTrigger) {
    let rest = trigger.hitbox.center;
    ctx.tweens.remove_entity(trigger.id);
    if let Some(entity) = ctx.scene.get_mut(trigger.id) {
        entity.pos = rest;
    }
    ctx.tweens.add(
        trigger.id,
        Tween::along(Axis::Y, rest.y, rest.y - ctx.config.bounce_height, ctx.config.bounce_duration, Easing::QuadOut)
            .with_loop(TweenLoop::Yoyo),
    );
}

impl Stage for GameplayStage {
    fn kind(&self) -> StageKind {
        StageKind::Main
    }

    fn setup(&mut self, ctx: &mut EngineContext) {
        ctx.reset_scene();
        ctx.theme = Theme::for_area(0);
        self.area = AreaState::default();
        self.overlapping.clear();
        self.unsubscribe_pad(ctx);
        self.subscribe_pad(ctx);

        self.built = match self.build(ctx) {
            Ok(()) => {
                log::info!(
                    "Gameplay ready: {} solids, {} content boxes, {} rendering",
                    self.solids.len(),
                    self.triggers.len(),
                    ctx.assets.scheme.as_str()
                );
                true
            }
            Err(err) => {
                log::error!("Gameplay scene construction failed: {:#}", err);
                false
            }
        };

        ctx.emit(BridgeEvent::SceneReady { stage: StageKind::Main });
        ctx.emit(BridgeEvent::GameReady);
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &mut InputState) -> StageFlow {
        if !self.built {
            return StageFlow::Continue;
        }
        let dt = ctx.config.fixed_dt;

        ctx.tweens.tick(dt, &mut ctx.scene);
        if self.area.transitioning {
            if let Some(entity) = ctx.scene.get(self.player.id) {
                self.player.pos.x = entity.pos.x;
            }
        }
        let finished: Vec<u32> = ctx.tweens.drain_completed().collect();
        if finished.contains(&AREA_SLIDE_DONE) {
            self.commit_area(ctx);
        }

        let intent = Intent::resolve(input, &mut self.pad.borrow_mut());
        let direction = if self.area.transitioning { 0 } else { intent.direction };

        self.apply_horizontal(ctx, direction, dt);
        if intent.jump {
            self.try_jump(ctx);
        }
        self.step_physics(ctx, dt);
        self.check_triggers(ctx);
        self.check_edges(ctx, direction);
        self.select_pose(ctx);
        self.sync_player_entity(ctx);

        StageFlow::Continue
    }

    fn teardown(&mut self, ctx: &mut EngineContext) {
        self.unsubscribe_pad(ctx);
        self.overlapping.clear();
        self.triggers.clear();
        self.solids.clear();
        self.built = false;
        ctx.reset_scene();
    }
}
