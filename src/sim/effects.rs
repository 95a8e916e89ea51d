//! Type-specific special effects fired when a bubble pops or bursts
//!
//! Three shapes of behavior:
//! - global: one record, no entity iteration (heal, damage, bonus windows)
//! - area: touches every live bubble within a radius of the trigger point
//!   (frozen slow, magnetic pull)
//! - delayed area: schedules pops through the `PopScheduler` (spiky chain,
//!   explosive blast)
//!
//! Types without a behavior fall through silently so new types degrade
//! gracefully.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bubble::{Bubble, BubbleId, BubbleType, PopCause, SlowModifier};
use super::hooks::{DamageSource, NotificationSink, PlayerHealth};
use super::physics::attract_within;
use super::scheduler::{PopScheduler, PopTicket};
use crate::consts::DEFAULT_BURST_DAMAGE;
use crate::ms_to_secs;

/// One completed side effect, consumed by the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectRecord {
    Heal { amount: f32 },
    Damage { amount: f32 },
    ChainDestroy { center: Vec2, radius: f32 },
    BonusTime { duration_ms: f32 },
    TimeStop { duration_ms: f32 },
    ScoreMultiplier { multiplier: f32, duration_ms: f32 },
    ScreenShake { intensity: f32, duration_ms: f32 },
    SlowArea {
        center: Vec2,
        radius: f32,
        factor: f32,
        duration_ms: f32,
    },
    MagneticPull { center: Vec2, radius: f32, strength: f32 },
    BigExplosion { center: Vec2, radius: f32, damage: f32 },
    NextScoreMultiplier { multiplier: f32, duration_ms: f32 },
    BonusScore { amount: u32 },
}

/// Effect balance values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSettings {
    pub heal_amount: f32,
    pub poison_damage: f32,
    pub chain_radius: f32,
    /// Stagger between consecutive chain pops
    pub chain_step_ms: f32,
    pub bonus_time_ms: f32,
    pub time_stop_ms: f32,
    pub shake_intensity: f32,
    pub shake_duration_ms: f32,
    pub golden_multiplier: f32,
    pub golden_duration_ms: f32,
    pub slow_radius: f32,
    pub slow_factor: f32,
    pub slow_duration_ms: f32,
    pub magnet_radius: f32,
    pub magnet_strength: f32,
    pub explosion_radius: f32,
    pub explosion_damage: f32,
    /// Delay for a bubble on the blast edge; closer bubbles pop sooner
    pub explosion_max_delay_ms: f32,
    pub next_hit_multiplier: f32,
    pub next_hit_duration_ms: f32,
    pub bonus_score: u32,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            heal_amount: 25.0,
            poison_damage: 8.0,
            chain_radius: 120.0,
            chain_step_ms: 100.0,
            bonus_time_ms: 8000.0,
            time_stop_ms: 2500.0,
            shake_intensity: 15.0,
            shake_duration_ms: 1500.0,
            golden_multiplier: 2.0,
            golden_duration_ms: 5000.0,
            slow_radius: 120.0,
            slow_factor: 0.5,
            slow_duration_ms: 8000.0,
            magnet_radius: 100.0,
            magnet_strength: 150.0,
            explosion_radius: 150.0,
            explosion_damage: 15.0,
            explosion_max_delay_ms: 500.0,
            next_hit_multiplier: 3.0,
            next_hit_duration_ms: 10_000.0,
            bonus_score: 80,
        }
    }
}

/// Frame-scoped collaborators for effect processing
pub struct EffectContext<'a> {
    pub now_ms: f64,
    pub dt_ms: f32,
    pub sink: &'a mut dyn NotificationSink,
    pub player: &'a mut dyn PlayerHealth,
}

fn default_burst_damage() -> HashMap<BubbleType, f32> {
    HashMap::from([
        (BubbleType::Normal, 5.0),
        (BubbleType::Stone, 8.0),
        (BubbleType::Iron, 10.0),
        (BubbleType::Diamond, 12.0),
        (BubbleType::Boss, 20.0),
        (BubbleType::Poison, 10.0),
        (BubbleType::Cracked, 3.0),
        (BubbleType::Explosive, 10.0),
    ])
}

/// Ids of live bubbles within `radius` of `center`, in collection order
fn live_within(bubbles: &[Bubble], center: Vec2, radius: f32, exclude: BubbleId) -> Vec<(BubbleId, f32)> {
    bubbles
        .iter()
        .filter(|b| b.is_alive() && b.id != exclude)
        .filter_map(|b| {
            let dist = b.pos.distance(center);
            (dist <= radius).then_some((b.id, dist))
        })
        .collect()
}

/// Dispatches special behavior by bubble type
#[derive(Debug, Clone)]
pub struct EffectProcessor {
    settings: EffectSettings,
    scheduler: PopScheduler,
    burst_damage: HashMap<BubbleType, f32>,
    /// Score bonus per type, read by scoring
    chain_bonus: HashMap<BubbleType, f32>,
    screen_shake: bool,
}

impl Default for EffectProcessor {
    fn default() -> Self {
        Self::new(EffectSettings::default())
    }
}

impl EffectProcessor {
    pub fn new(settings: EffectSettings) -> Self {
        Self {
            settings,
            scheduler: PopScheduler::new(),
            burst_damage: default_burst_damage(),
            chain_bonus: HashMap::new(),
            screen_shake: true,
        }
    }

    pub fn settings(&self) -> &EffectSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut EffectSettings {
        &mut self.settings
    }

    pub fn scheduler(&self) -> &PopScheduler {
        &self.scheduler
    }

    pub fn set_screen_shake(&mut self, enabled: bool) {
        self.screen_shake = enabled;
    }

    pub fn set_chain_bonus(&mut self, kind: BubbleType, bonus: f32) {
        self.chain_bonus.insert(kind, bonus);
    }

    pub fn chain_bonus(&self, kind: BubbleType) -> Option<f32> {
        self.chain_bonus.get(&kind).copied()
    }

    pub fn set_burst_damage(&mut self, kind: BubbleType, damage: f32) {
        self.burst_damage.insert(kind, damage);
    }

    pub fn burst_damage(&self, kind: BubbleType) -> f32 {
        self.burst_damage
            .get(&kind)
            .copied()
            .unwrap_or(DEFAULT_BURST_DAMAGE)
    }

    pub fn cancel_pop(&mut self, ticket: PopTicket) -> bool {
        self.scheduler.cancel(ticket)
    }

    /// Fire scheduled chain/explosion pops that are due
    pub fn fire_due(&mut self, now_ms: f64, bubbles: &mut [Bubble]) -> Vec<(BubbleId, PopCause)> {
        self.scheduler.fire_due(now_ms, bubbles)
    }

    pub fn clear_scheduled(&mut self) {
        self.scheduler.clear();
    }

    /// Fire the special behavior of `bubble_id`, triggered at `at`.
    ///
    /// Records are queued on the triggering bubble. Returns how many were queued.
    pub fn process(
        &mut self,
        bubble_id: BubbleId,
        at: Vec2,
        bubbles: &mut [Bubble],
        ctx: &mut EffectContext<'_>,
    ) -> usize {
        let Some(index) = bubbles.iter().position(|b| b.id == bubble_id) else {
            log::trace!("process: bubble #{bubble_id} not in collection");
            return 0;
        };
        let kind = bubbles[index].kind;
        let s = self.settings;
        let now = ctx.now_ms;

        let records = match kind {
            BubbleType::Rainbow => vec![EffectRecord::BonusTime {
                duration_ms: s.bonus_time_ms,
            }],
            BubbleType::Pink => {
                ctx.player.heal(s.heal_amount);
                ctx.sink.on_healed(s.heal_amount);
                vec![EffectRecord::Heal {
                    amount: s.heal_amount,
                }]
            }
            BubbleType::Clock => vec![EffectRecord::TimeStop {
                duration_ms: s.time_stop_ms,
            }],
            BubbleType::Electric => {
                let intensity = if self.screen_shake {
                    s.shake_intensity
                } else {
                    0.0
                };
                vec![EffectRecord::ScreenShake {
                    intensity,
                    duration_ms: s.shake_duration_ms,
                }]
            }
            BubbleType::Poison => {
                ctx.player.take_damage(s.poison_damage);
                ctx.sink.on_damage_taken(s.poison_damage, DamageSource::Poison);
                vec![EffectRecord::Damage {
                    amount: s.poison_damage,
                }]
            }
            BubbleType::Golden => vec![EffectRecord::ScoreMultiplier {
                multiplier: s.golden_multiplier,
                duration_ms: s.golden_duration_ms,
            }],
            BubbleType::Multiplier => vec![EffectRecord::NextScoreMultiplier {
                multiplier: s.next_hit_multiplier,
                duration_ms: s.next_hit_duration_ms,
            }],
            BubbleType::Score => vec![EffectRecord::BonusScore {
                amount: s.bonus_score,
            }],
            BubbleType::Spiky => {
                let targets = live_within(bubbles, at, s.chain_radius, bubble_id);
                for (i, (target, _)) in targets.iter().enumerate() {
                    let delay = (i + 1) as f64 * s.chain_step_ms as f64;
                    self.scheduler.schedule(*target, PopCause::Chain, now + delay);
                }
                log::debug!("Chain reaction from #{bubble_id}: {} queued", targets.len());
                vec![EffectRecord::ChainDestroy {
                    center: at,
                    radius: s.chain_radius,
                }]
            }
            BubbleType::Frozen => {
                let modifier = SlowModifier {
                    factor: s.slow_factor,
                    expires_at_ms: now + s.slow_duration_ms as f64,
                };
                for bubble in bubbles.iter_mut() {
                    if bubble.id != bubble_id
                        && bubble.is_alive()
                        && bubble.pos.distance(at) <= s.slow_radius
                    {
                        bubble.modifier = Some(modifier);
                    }
                }
                vec![EffectRecord::SlowArea {
                    center: at,
                    radius: s.slow_radius,
                    factor: s.slow_factor,
                    duration_ms: s.slow_duration_ms,
                }]
            }
            BubbleType::Magnetic => {
                let impulse = s.magnet_strength * ms_to_secs(ctx.dt_ms);
                attract_within(bubbles, at, s.magnet_radius, impulse, Some(bubble_id));
                vec![EffectRecord::MagneticPull {
                    center: at,
                    radius: s.magnet_radius,
                    strength: s.magnet_strength,
                }]
            }
            BubbleType::Explosive => {
                let radius = s.explosion_radius.max(1.0);
                let targets = live_within(bubbles, at, radius, bubble_id);
                for (target, dist) in &targets {
                    let delay = (dist / radius).clamp(0.0, 1.0) * s.explosion_max_delay_ms;
                    self.scheduler
                        .schedule(*target, PopCause::Explosion, now + delay as f64);
                }
                ctx.player.take_damage(s.explosion_damage);
                ctx.sink
                    .on_damage_taken(s.explosion_damage, DamageSource::Explosion);
                log::info!(
                    "Big explosion from #{bubble_id} at {at}: {} bubbles caught",
                    targets.len()
                );
                vec![EffectRecord::BigExplosion {
                    center: at,
                    radius,
                    damage: s.explosion_damage,
                }]
            }
            BubbleType::Normal
            | BubbleType::Stone
            | BubbleType::Iron
            | BubbleType::Diamond
            | BubbleType::Escaping
            | BubbleType::Cracked
            | BubbleType::Boss
            | BubbleType::Phantom => Vec::new(),
        };

        if records.is_empty() {
            return 0;
        }
        ctx.sink.on_special_effect(kind, at);
        let count = records.len();
        let trigger = &mut bubbles[index];
        for record in records {
            trigger.queue_effect(record);
        }
        count
    }

    /// Burst a bubble whose time is up. Returns true if it burst now.
    ///
    /// Cracked bubbles give out at half their lifespan.
    pub fn check_auto_burst(&self, bubble: &mut Bubble, ctx: &mut EffectContext<'_>) -> bool {
        if !bubble.is_alive() {
            return false;
        }
        let cracked_early = bubble.kind == BubbleType::Cracked
            && bubble.max_age > 0.0
            && bubble.age > bubble.max_age / 2.0;
        if !(cracked_early || bubble.is_expired()) {
            return false;
        }
        if !bubble.terminate(PopCause::Expired) {
            return false;
        }
        let damage = self.burst_damage(bubble.kind);
        ctx.player.take_damage(damage);
        ctx.sink
            .on_damage_taken(damage, DamageSource::Burst(bubble.kind));
        log::debug!("Bubble #{} burst, {} damage", bubble.id, damage);
        true
    }
}
