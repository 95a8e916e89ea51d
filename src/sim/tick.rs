//! Frame driver
//!
//! `BubbleSim` owns the live bubble collection and the four subsystems and
//! advances them in a fixed order every frame:
//! spawn -> physics -> collisions -> drag -> effects.
//! It also exposes each subsystem operation individually for callers that
//! drive their own loop.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bubble::{Bubble, BubbleId, BubbleType, PopCause};
use super::drag::{DragRelease, DragSettings, DragState, DragSystem};
use super::effects::{EffectContext, EffectProcessor, EffectRecord, EffectSettings};
use super::field::PlayField;
use super::hooks::{NotificationSink, PlayerHealth};
use super::physics::{PerformanceStats, PhysicsEngine, PhysicsSettings, PhysicsSettingsUpdate};
use super::spawner::Spawner;
use crate::consts::*;
use crate::error::{ConfigError, EnvironmentError, SimError};
use crate::settings::Settings;
use crate::stages::StagePreset;

/// Everything needed to build a simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub field_width: f32,
    pub field_height: f32,
    pub settings: Settings,
    pub physics: PhysicsSettings,
    pub effects: EffectSettings,
    pub drag: DragSettings,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            field_width: DEFAULT_FIELD_WIDTH,
            field_height: DEFAULT_FIELD_HEIGHT,
            settings: Settings::default(),
            physics: PhysicsSettings::default(),
            effects: EffectSettings::default(),
            drag: DragSettings::default(),
        }
    }
}

/// Pointer transitions delivered with a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up(Vec2),
    Cancel,
}

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Current pointer position (escaping bubbles flee it)
    pub pointer: Option<Vec2>,
    /// Pointer events in arrival order
    pub events: Vec<PointerEvent>,
}

/// What happened during one frame
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    pub frame: u64,
    pub spawned: Vec<BubbleId>,
    /// Pops in processing order (player taps, chains, explosions)
    pub popped: Vec<(BubbleId, PopCause)>,
    /// Bubbles that burst on their own
    pub burst: Vec<BubbleId>,
    pub effects: Vec<(BubbleId, EffectRecord)>,
    pub releases: Vec<DragRelease>,
    pub collisions: u32,
    pub score: u32,
    /// Dead bubbles dropped from the collection
    pub removed: usize,
}

/// Spawner, physics, drag and effects around one bubble collection
#[derive(Debug, Clone)]
pub struct BubbleSim {
    bubbles: Vec<Bubble>,
    spawner: Spawner,
    physics: PhysicsEngine,
    drag: DragSystem,
    effects: EffectProcessor,
    settings: Settings,
    /// Stream for tap pass-through rolls, separate from spawning
    rng: Pcg32,
    clock_ms: f64,
    last_dt_ms: f32,
    frame: u64,
}

impl BubbleSim {
    pub fn new(config: SimConfig) -> Result<Self, SimError> {
        let field = PlayField::new(config.field_width, config.field_height)?;
        let mut spawner = Spawner::new(config.seed);
        spawner.set_play_field(field);

        let mut sim = Self {
            bubbles: Vec::new(),
            spawner,
            physics: PhysicsEngine::with_settings(field, config.physics),
            drag: DragSystem::new(config.drag),
            effects: EffectProcessor::new(config.effects),
            settings: config.settings.clone(),
            rng: Pcg32::seed_from_u64(config.seed.wrapping_add(1)),
            clock_ms: 0.0,
            last_dt_ms: FRAME_DT_MS,
            frame: 0,
        };
        sim.apply_settings(config.settings);
        log::info!(
            "Simulation ready: seed={} field={}x{}",
            config.seed,
            field.width,
            field.height
        );
        Ok(sim)
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn bubble(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.iter().find(|b| b.id == id)
    }

    pub fn bubble_mut(&mut self, id: BubbleId) -> Option<&mut Bubble> {
        self.bubbles.iter_mut().find(|b| b.id == id)
    }

    pub fn live_count(&self) -> usize {
        self.bubbles.iter().filter(|b| b.is_alive()).count()
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn field(&self) -> PlayField {
        self.physics.field()
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    pub fn spawner_mut(&mut self) -> &mut Spawner {
        &mut self.spawner
    }

    pub fn physics(&self) -> &PhysicsEngine {
        &self.physics
    }

    pub fn effects(&self) -> &EffectProcessor {
        &self.effects
    }

    pub fn effects_mut(&mut self) -> &mut EffectProcessor {
        &mut self.effects
    }

    pub fn drag(&self) -> &DragSystem {
        &self.drag
    }

    /// Install quality and throttle settings
    pub fn apply_settings(&mut self, settings: Settings) {
        self.spawner.set_quality(settings.quality);
        self.spawner
            .set_frequency_multiplier(settings.frequency_multiplier);
        self.effects
            .set_screen_shake(settings.effective_screen_shake());
        log::info!(
            "Quality {} (frequency x{})",
            settings.quality.as_str(),
            settings.frequency_multiplier
        );
        self.settings = settings;
    }

    pub fn set_play_field(&mut self, width: f32, height: f32) -> Result<(), EnvironmentError> {
        let field = PlayField::new(width, height)?;
        self.physics.set_field(field);
        self.spawner.set_play_field(field);
        Ok(())
    }

    /// Switch to a stage's roster and rates. On error nothing changes.
    pub fn apply_stage(&mut self, stage: &StagePreset) -> Result<(), ConfigError> {
        let config = stage.spawn_config()?;
        self.spawner.set_policy(&config)?;
        let bonus = stage.chain_bonus.unwrap_or(1.0);
        self.effects.set_chain_bonus(BubbleType::Spiky, bonus);
        self.effects.set_chain_bonus(BubbleType::Explosive, bonus);
        log::info!("Stage `{}` applied", stage.id);
        Ok(())
    }

    pub fn spawn_bubble(
        &mut self,
        kind: Option<&str>,
        position: Option<Vec2>,
    ) -> Result<BubbleId, EnvironmentError> {
        let bubble = self.spawner.spawn(kind, position)?;
        let id = bubble.id;
        self.bubbles.push(bubble);
        Ok(id)
    }

    pub fn spawn_specific_bubble(
        &mut self,
        kind: BubbleType,
        position: Option<Vec2>,
    ) -> Result<BubbleId, EnvironmentError> {
        let bubble = self.spawner.spawn_specific(kind, position)?;
        let id = bubble.id;
        self.bubbles.push(bubble);
        Ok(id)
    }

    pub fn update_spawn_timer(&mut self, dt_ms: f32) -> bool {
        let live = self.live_count();
        self.spawner.tick(dt_ms, live)
    }

    /// Integrate one bubble at the current clock. False if the id is unknown.
    pub fn update_bubble(&mut self, id: BubbleId, dt_ms: f32) -> bool {
        let now = self.clock_ms;
        match self.bubbles.iter_mut().find(|b| b.id == id) {
            Some(bubble) => {
                self.physics.update(bubble, dt_ms, now);
                true
            }
            None => false,
        }
    }

    pub fn apply_force_to_bubble(&mut self, id: BubbleId, direction: Vec2, magnitude: f32) -> bool {
        match self.bubbles.iter_mut().find(|b| b.id == id) {
            Some(bubble) => self.physics.apply_force(bubble, direction, magnitude),
            None => false,
        }
    }

    pub fn check_collisions(&mut self) -> u32 {
        self.physics.resolve_collisions(&mut self.bubbles)
    }

    pub fn handle_drag_start(&mut self, pos: Vec2) -> Option<BubbleId> {
        self.drag.on_drag_start(&self.bubbles, pos, self.clock_ms)
    }

    pub fn handle_drag_move(&mut self, pos: Vec2) -> bool {
        self.drag.on_drag_move(pos, self.clock_ms)
    }

    pub fn handle_drag_end(&mut self, pos: Vec2) -> DragRelease {
        let start = match self.drag.state() {
            DragState::Dragging(session) => session.start,
            DragState::Idle => return DragRelease::NotDragging,
        };
        self.drag
            .on_drag_end(start, pos, &mut self.bubbles, &mut self.physics)
    }

    pub fn update_physics_settings(&mut self, update: &PhysicsSettingsUpdate) {
        self.physics.update_settings(update);
    }

    pub fn performance_stats(&self) -> PerformanceStats {
        self.physics.performance_stats()
    }

    /// Fire the special behavior of `id` at `at`. Returns records queued.
    pub fn process_bubble_effect(
        &mut self,
        id: BubbleId,
        at: Vec2,
        sink: &mut dyn NotificationSink,
        player: &mut dyn PlayerHealth,
    ) -> usize {
        let mut ctx = EffectContext {
            now_ms: self.clock_ms,
            dt_ms: self.last_dt_ms,
            sink,
            player,
        };
        self.effects.process(id, at, &mut self.bubbles, &mut ctx)
    }

    pub fn check_auto_burst(
        &mut self,
        id: BubbleId,
        sink: &mut dyn NotificationSink,
        player: &mut dyn PlayerHealth,
    ) -> bool {
        let mut ctx = EffectContext {
            now_ms: self.clock_ms,
            dt_ms: self.last_dt_ms,
            sink,
            player,
        };
        match self.bubbles.iter_mut().find(|b| b.id == id) {
            Some(bubble) => self.effects.check_auto_burst(bubble, &mut ctx),
            None => false,
        }
    }

    /// Player hit on a tapped bubble. True if it popped.
    fn player_tap(&mut self, id: BubbleId) -> bool {
        let Some(bubble) = self.bubbles.iter_mut().find(|b| b.id == id) else {
            return false;
        };
        let phase = bubble.kind.phase_chance();
        if phase > 0.0 && self.rng.random::<f32>() < phase {
            log::debug!("Tap passed through #{id}");
            return false;
        }
        bubble.hit(1)
    }

    fn pop_score(&self, bubble: &Bubble, cause: PopCause) -> u32 {
        let trigger = match cause {
            PopCause::Chain => Some(BubbleType::Spiky),
            PopCause::Explosion => Some(BubbleType::Explosive),
            PopCause::Player | PopCause::Expired => None,
        };
        let bonus = trigger
            .and_then(|t| self.effects.chain_bonus(t))
            .unwrap_or(1.0);
        (bubble.score() as f32 * bonus).round() as u32
    }

    /// Continuous pulls and damping around live magnetic/frozen bubbles
    fn apply_source_effects(&mut self, dt_ms: f32) {
        let sources: Vec<(BubbleId, BubbleType)> = self
            .bubbles
            .iter()
            .filter(|b| b.is_alive() && matches!(b.kind, BubbleType::Magnetic | BubbleType::Frozen))
            .map(|b| (b.id, b.kind))
            .collect();
        for (id, kind) in sources {
            match kind {
                BubbleType::Magnetic => {
                    self.physics
                        .apply_magnetic_effect(id, &mut self.bubbles, dt_ms);
                }
                BubbleType::Frozen => {
                    self.physics.apply_frozen_effect(id, &mut self.bubbles, dt_ms);
                }
                _ => {}
            }
        }
    }

    /// Advance the whole simulation by one frame
    pub fn tick(
        &mut self,
        input: &TickInput,
        dt_ms: f32,
        sink: &mut dyn NotificationSink,
        player: &mut dyn PlayerHealth,
    ) -> FrameReport {
        let dt = if dt_ms.is_finite() && dt_ms >= 0.0 {
            dt_ms.min(MAX_FRAME_DT_MS)
        } else {
            log::warn!("Ignoring invalid frame delta {dt_ms}");
            0.0
        };
        self.clock_ms += dt as f64;
        self.last_dt_ms = dt;
        self.frame += 1;
        let now = self.clock_ms;
        let mut report = FrameReport {
            frame: self.frame,
            ..Default::default()
        };

        // Spawn
        if self.update_spawn_timer(dt) {
            match self.spawn_bubble(None, None) {
                Ok(id) => report.spawned.push(id),
                Err(e) => log::warn!("Spawn skipped: {e}"),
            }
        }

        // Physics
        self.physics.set_repulsion_point(input.pointer);
        for bubble in self.bubbles.iter_mut() {
            self.physics.update(bubble, dt, now);
        }
        if self.settings.quality.source_effects_enabled() {
            self.apply_source_effects(dt);
        }

        // Collisions
        report.collisions = self.physics.resolve_collisions(&mut self.bubbles);

        // Drag
        let mut pops = Vec::new();
        for event in &input.events {
            match *event {
                PointerEvent::Down(pos) => {
                    self.handle_drag_start(pos);
                }
                PointerEvent::Move(pos) => {
                    self.handle_drag_move(pos);
                }
                PointerEvent::Up(pos) => {
                    let release = self.handle_drag_end(pos);
                    if let DragRelease::Tap(id) = release {
                        if self.player_tap(id) {
                            pops.push((id, PopCause::Player));
                        }
                    }
                    report.releases.push(release);
                }
                PointerEvent::Cancel => self.drag.on_drag_cancel(),
            }
        }

        // Effects
        let mut ctx = EffectContext {
            now_ms: now,
            dt_ms: dt,
            sink,
            player,
        };
        pops.extend(self.effects.fire_due(now, &mut self.bubbles));
        for bubble in self.bubbles.iter_mut() {
            if self.effects.check_auto_burst(bubble, &mut ctx) {
                report.burst.push(bubble.id);
            }
        }

        // Pops can schedule zero-delay pops of their own, so drain until quiet
        let mut queue: VecDeque<(BubbleId, PopCause)> = pops.into();
        loop {
            while let Some((id, cause)) = queue.pop_front() {
                let Some(bubble) = self.bubbles.iter().find(|b| b.id == id) else {
                    continue;
                };
                let at = bubble.pos;
                report.score += self.pop_score(bubble, cause);
                report.popped.push((id, cause));
                self.effects.process(id, at, &mut self.bubbles, &mut ctx);
            }
            let due = self.effects.fire_due(now, &mut self.bubbles);
            if due.is_empty() {
                break;
            }
            queue.extend(due);
        }

        for bubble in self.bubbles.iter_mut() {
            let id = bubble.id;
            report
                .effects
                .extend(bubble.take_effects().into_iter().map(|record| (id, record)));
        }
        let before = self.bubbles.len();
        self.bubbles.retain(Bubble::is_alive);
        report.removed = before - self.bubbles.len();

        report
    }
}
