//! Bubble spawning: when to create a bubble and what to create
//!
//! Randomness comes from an injected RNG so spawning is reproducible per seed.
//! Malformed spawn requests never fail; they are sanitized with a warning.
//! The only fatal condition is a missing play field.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bubble::{Bubble, BubbleId, BubbleType};
use super::field::PlayField;
use crate::consts::*;
use crate::error::{ConfigError, EnvironmentError};
use crate::settings::{QualityPreset, sanitize_frequency};

/// One scripted override: spawn `kind` with this probability before the roster pick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeChance {
    #[serde(rename = "type")]
    pub kind: String,
    pub probability: f64,
}

/// Raw spawn configuration, as supplied by stage scripts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpawnConfig {
    pub max_bubbles: Option<f64>,
    pub spawn_interval_ms: Option<f64>,
    pub bubble_types: Option<Vec<String>>,
    #[serde(default)]
    pub type_chances: Vec<TypeChance>,
}

impl SpawnConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Validated spawn policy
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnPolicy {
    pub max_bubbles: usize,
    pub spawn_interval_ms: f32,
    pub allowed_types: Vec<BubbleType>,
    /// Checked in order; first Bernoulli success wins
    pub type_overrides: Vec<(BubbleType, f64)>,
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self {
            max_bubbles: DEFAULT_MAX_BUBBLES,
            spawn_interval_ms: DEFAULT_SPAWN_INTERVAL_MS,
            allowed_types: vec![BubbleType::Normal],
            type_overrides: Vec::new(),
        }
    }
}

fn positive(field: &'static str, value: Option<f64>) -> Result<f64, ConfigError> {
    let value = value.ok_or(ConfigError::Missing(field))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::NotPositive { field, value });
    }
    Ok(value)
}

fn parse_type(name: &str) -> Result<BubbleType, ConfigError> {
    BubbleType::from_str(name).ok_or_else(|| ConfigError::UnknownBubbleType(name.to_string()))
}

impl TryFrom<&SpawnConfig> for SpawnPolicy {
    type Error = ConfigError;

    fn try_from(config: &SpawnConfig) -> Result<Self, Self::Error> {
        let max_bubbles = positive("max_bubbles", config.max_bubbles)?;
        let spawn_interval_ms = positive("spawn_interval_ms", config.spawn_interval_ms)?;

        let names = config
            .bubble_types
            .as_ref()
            .ok_or(ConfigError::Missing("bubble_types"))?;
        if names.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        let allowed_types = names
            .iter()
            .map(|name| parse_type(name))
            .collect::<Result<Vec<_>, _>>()?;

        let mut type_overrides = Vec::with_capacity(config.type_chances.len());
        for chance in &config.type_chances {
            let kind = parse_type(&chance.kind)?;
            if !(0.0..=1.0).contains(&chance.probability) {
                return Err(ConfigError::OutOfRange {
                    field: "type_chances.probability",
                    value: chance.probability,
                    min: 0.0,
                    max: 1.0,
                });
            }
            type_overrides.push((kind, chance.probability));
        }

        Ok(Self {
            max_bubbles: max_bubbles.floor().max(1.0) as usize,
            spawn_interval_ms: spawn_interval_ms as f32,
            allowed_types,
            type_overrides,
        })
    }
}

/// Decides when and what to spawn
#[derive(Debug, Clone)]
pub struct Spawner<R = Pcg32> {
    policy: SpawnPolicy,
    timer_ms: f32,
    field: Option<PlayField>,
    rng: R,
    next_id: BubbleId,
    /// External performance throttle (scales accumulated time)
    frequency_multiplier: f32,
    /// Quality-derived spawn interval stretch
    interval_stretch: f32,
    /// External cap on live bubbles
    ceiling: Option<usize>,
}

impl Spawner<Pcg32> {
    /// Spawner with a seeded PCG stream
    pub fn new(seed: u64) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> Spawner<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            policy: SpawnPolicy::default(),
            timer_ms: 0.0,
            field: None,
            rng,
            next_id: 1,
            frequency_multiplier: 1.0,
            interval_stretch: 1.0,
            ceiling: None,
        }
    }

    pub fn policy(&self) -> &SpawnPolicy {
        &self.policy
    }

    pub fn play_field(&self) -> Option<PlayField> {
        self.field
    }

    pub fn set_play_field(&mut self, field: PlayField) {
        self.field = Some(field);
    }

    /// Validate and install a new policy. On error the current policy stays.
    pub fn set_policy(&mut self, config: &SpawnConfig) -> Result<(), ConfigError> {
        match SpawnPolicy::try_from(config) {
            Ok(policy) => {
                log::info!(
                    "Spawn policy: max={} interval={}ms roster={:?}",
                    policy.max_bubbles,
                    policy.spawn_interval_ms,
                    policy.allowed_types
                );
                self.policy = policy;
                Ok(())
            }
            Err(e) => {
                log::warn!("Rejected spawn policy ({e}), keeping previous");
                Err(e)
            }
        }
    }

    pub fn set_frequency_multiplier(&mut self, multiplier: f32) {
        self.frequency_multiplier = sanitize_frequency(multiplier);
    }

    pub fn set_quality(&mut self, quality: QualityPreset) {
        self.interval_stretch = quality.spawn_interval_stretch();
        self.ceiling = Some(quality.max_bubble_ceiling());
    }

    pub fn set_ceiling(&mut self, ceiling: Option<usize>) {
        self.ceiling = ceiling;
    }

    pub fn effective_interval_ms(&self) -> f32 {
        self.policy.spawn_interval_ms * self.interval_stretch
    }

    pub fn effective_max(&self) -> usize {
        match self.ceiling {
            Some(ceiling) => self.policy.max_bubbles.min(ceiling),
            None => self.policy.max_bubbles,
        }
    }

    /// Advance the spawn timer. True means "spawn one bubble now".
    pub fn tick(&mut self, dt_ms: f32, live_count: usize) -> bool {
        if dt_ms.is_finite() && dt_ms > 0.0 {
            self.timer_ms += dt_ms * self.frequency_multiplier;
        }
        if self.timer_ms >= self.effective_interval_ms() && live_count < self.effective_max() {
            self.timer_ms = 0.0;
            true
        } else {
            false
        }
    }

    fn allocate_id(&mut self) -> BubbleId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn a bubble, sanitizing the requested type and position
    pub fn spawn(
        &mut self,
        kind: Option<&str>,
        position: Option<Vec2>,
    ) -> Result<Bubble, EnvironmentError> {
        // Checked before any sanitizing so a missing field is never masked
        PlayField::require(self.field)?;
        let kind = match kind {
            Some(name) => BubbleType::from_str(name).unwrap_or_else(|| {
                log::warn!("Unknown bubble type `{name}`, spawning normal");
                BubbleType::Normal
            }),
            None => self.draw_type(),
        };
        self.spawn_specific(kind, position)
    }

    /// Spawn a bubble of a known type
    pub fn spawn_specific(
        &mut self,
        kind: BubbleType,
        position: Option<Vec2>,
    ) -> Result<Bubble, EnvironmentError> {
        let field = PlayField::require(self.field)?;
        let pos = match position {
            Some(p) if field.within_sanity_bound(p) => p,
            Some(p) => {
                log::warn!("Spawn position {p} out of bounds, using a random one");
                self.random_position(&field)
            }
            None => self.random_position(&field),
        };

        let id = self.allocate_id();
        let mut bubble = Bubble::new(id, kind, pos);
        let angle = self.rng.random_range(0.0..std::f32::consts::TAU);
        let speed = self.rng.random_range(SPAWN_MIN_SPEED..SPAWN_MAX_SPEED);
        bubble.vel = Vec2::from_angle(angle) * speed;
        log::debug!("Spawned {} #{} at {}", kind.as_str(), id, pos);
        Ok(bubble)
    }

    /// Override list first (in order), then a uniform roster pick
    fn draw_type(&mut self) -> BubbleType {
        for &(kind, probability) in &self.policy.type_overrides {
            if self.rng.random::<f64>() < probability {
                return kind;
            }
        }
        let roster = &self.policy.allowed_types;
        if roster.is_empty() {
            return BubbleType::Normal;
        }
        roster[self.rng.random_range(0..roster.len())]
    }

    fn random_position(&mut self, field: &PlayField) -> Vec2 {
        let (mx, my) = field.inset_margin(SPAWN_MARGIN);
        let x = if field.width - mx > mx {
            self.rng.random_range(mx..field.width - mx)
        } else {
            mx
        };
        let y = if field.height - my > my {
            self.rng.random_range(my..field.height - my)
        } else {
            my
        };
        Vec2::new(x, y)
    }
}
