//! Bubble entities and the per-type balance table
//!
//! Everything the rest of the simulation mutates lives on `Bubble`: kinematics,
//! health, lifetime, an optional slow modifier and the queue of completed
//! effect records waiting to be drained by the owner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::effects::EffectRecord;

/// Opaque bubble identity (allocated monotonically by the spawner)
pub type BubbleId = u32;

/// Bubble types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BubbleType {
    #[default]
    Normal,
    Stone,
    Iron,
    Diamond,
    Pink,
    Poison,
    Spiky,
    Rainbow,
    Clock,
    Score,
    Electric,
    Escaping,
    Cracked,
    Boss,
    Golden,
    Frozen,
    Magnetic,
    Explosive,
    Phantom,
    Multiplier,
}

/// Static balance values for one bubble type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleProfile {
    pub health: u32,
    pub size: f32,
    pub max_age_ms: f32,
    pub score: u32,
    /// Display color (sRGB hex)
    pub color: u32,
}

const fn profile(health: u32, size: f32, max_age_ms: f32, score: u32, color: u32) -> BubbleProfile {
    BubbleProfile {
        health,
        size,
        max_age_ms,
        score,
        color,
    }
}

impl BubbleType {
    /// Every known type, in roster order
    pub const ALL: [BubbleType; 20] = [
        BubbleType::Normal,
        BubbleType::Stone,
        BubbleType::Iron,
        BubbleType::Diamond,
        BubbleType::Pink,
        BubbleType::Poison,
        BubbleType::Spiky,
        BubbleType::Rainbow,
        BubbleType::Clock,
        BubbleType::Score,
        BubbleType::Electric,
        BubbleType::Escaping,
        BubbleType::Cracked,
        BubbleType::Boss,
        BubbleType::Golden,
        BubbleType::Frozen,
        BubbleType::Magnetic,
        BubbleType::Explosive,
        BubbleType::Phantom,
        BubbleType::Multiplier,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BubbleType::Normal => "normal",
            BubbleType::Stone => "stone",
            BubbleType::Iron => "iron",
            BubbleType::Diamond => "diamond",
            BubbleType::Pink => "pink",
            BubbleType::Poison => "poison",
            BubbleType::Spiky => "spiky",
            BubbleType::Rainbow => "rainbow",
            BubbleType::Clock => "clock",
            BubbleType::Score => "score",
            BubbleType::Electric => "electric",
            BubbleType::Escaping => "escaping",
            BubbleType::Cracked => "cracked",
            BubbleType::Boss => "boss",
            BubbleType::Golden => "golden",
            BubbleType::Frozen => "frozen",
            BubbleType::Magnetic => "magnetic",
            BubbleType::Explosive => "explosive",
            BubbleType::Phantom => "phantom",
            BubbleType::Multiplier => "multiplier",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let name = s.trim().to_lowercase();
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// Balance values (health, size, lifetime, score, color)
    pub fn profile(&self) -> BubbleProfile {
        match self {
            BubbleType::Normal => profile(1, 50.0, 12_000.0, 15, 0x87CEEB),
            BubbleType::Stone => profile(2, 55.0, 16_000.0, 25, 0x696969),
            BubbleType::Iron => profile(3, 60.0, 20_000.0, 40, 0x708090),
            BubbleType::Diamond => profile(4, 65.0, 22_000.0, 60, 0xB0E0E6),
            BubbleType::Pink => profile(1, 45.0, 10_000.0, 20, 0xFFB6C1),
            BubbleType::Poison => profile(1, 48.0, 14_000.0, 30, 0x9370DB),
            BubbleType::Spiky => profile(1, 52.0, 13_000.0, 35, 0xFF6347),
            BubbleType::Rainbow => profile(1, 55.0, 16_000.0, 400, 0xFF69B4),
            BubbleType::Clock => profile(1, 50.0, 20_000.0, 180, 0xFFD700),
            BubbleType::Score => profile(1, 48.0, 9_000.0, 250, 0x32CD32),
            BubbleType::Electric => profile(1, 50.0, 13_000.0, 20, 0xFFFF00),
            BubbleType::Escaping => profile(1, 45.0, 16_000.0, 50, 0xFF8C00),
            BubbleType::Cracked => profile(1, 52.0, 6_000.0, 30, 0x8B4513),
            BubbleType::Boss => profile(8, 90.0, 35_000.0, 100, 0x8B0000),
            BubbleType::Golden => profile(1, 55.0, 8_000.0, 500, 0xFFD700),
            BubbleType::Frozen => profile(2, 50.0, 25_000.0, 100, 0x87CEEB),
            BubbleType::Magnetic => profile(1, 48.0, 15_000.0, 150, 0xFF1493),
            BubbleType::Explosive => profile(1, 52.0, 10_000.0, 200, 0xFF4500),
            BubbleType::Phantom => profile(1, 45.0, 12_000.0, 300, 0x9370DB),
            BubbleType::Multiplier => profile(1, 50.0, 18_000.0, 100, 0x32CD32),
        }
    }

    /// Chance that a tap passes straight through the bubble
    pub fn phase_chance(&self) -> f32 {
        match self {
            BubbleType::Phantom => 0.3,
            _ => 0.0,
        }
    }
}

/// Motion state shared by the integrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    /// Plain ballistic motion
    Free,
    /// Steers away from the repulsion point before integrating
    Escaping,
}

/// Transient velocity scale applied every tick until `expires_at_ms`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlowModifier {
    pub factor: f32,
    pub expires_at_ms: f64,
}

impl SlowModifier {
    pub fn is_active(&self, now_ms: f64) -> bool {
        now_ms < self.expires_at_ms
    }
}

/// What ended a bubble's life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PopCause {
    /// Popped by the player
    Player,
    /// Popped by a spiky chain reaction
    Chain,
    /// Popped by a big explosion
    Explosion,
    /// Burst on its own (lifespan or cracked early burst)
    Expired,
}

/// A bubble entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bubble {
    pub id: BubbleId,
    pub kind: BubbleType,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub health: u32,
    pub max_health: u32,
    /// Milliseconds since spawn
    pub age: f32,
    /// Lifespan in milliseconds (0 = immortal)
    pub max_age: f32,
    alive: bool,
    /// Set once, together with `alive = false`
    pub pop_cause: Option<PopCause>,
    pub modifier: Option<SlowModifier>,
    /// Completed effect records, drained by the owner
    #[serde(default)]
    pub effects: Vec<EffectRecord>,
}

impl Bubble {
    pub fn new(id: BubbleId, kind: BubbleType, pos: Vec2) -> Self {
        let profile = kind.profile();
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            size: profile.size,
            health: profile.health,
            max_health: profile.health,
            age: 0.0,
            max_age: profile.max_age_ms,
            alive: true,
            pop_cause: None,
            modifier: None,
            effects: Vec::new(),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Collision radius
    #[inline]
    pub fn radius(&self) -> f32 {
        self.size / 2.0
    }

    pub fn motion_state(&self) -> MotionState {
        if self.kind == BubbleType::Escaping {
            MotionState::Escaping
        } else {
            MotionState::Free
        }
    }

    /// Touch hit-test. Uses the full size so small bubbles stay tappable.
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.pos.distance(point) <= self.size
    }

    /// Fraction of lifespan used (0 for immortal bubbles)
    pub fn age_ratio(&self) -> f32 {
        if self.max_age > 0.0 {
            (self.age / self.max_age).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health == 0 {
            0.0
        } else {
            self.health as f32 / self.max_health as f32
        }
    }

    /// Whether the lifespan has run out
    pub fn is_expired(&self) -> bool {
        self.max_age > 0.0 && self.age >= self.max_age
    }

    /// The single terminal transition. Returns false if already dead.
    pub fn terminate(&mut self, cause: PopCause) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.pop_cause = Some(cause);
        true
    }

    /// Apply a player hit. Returns true when this hit destroyed the bubble.
    pub fn hit(&mut self, damage: u32) -> bool {
        if !self.alive {
            return false;
        }
        self.health = self.health.saturating_sub(damage.max(1));
        if self.health == 0 {
            self.terminate(PopCause::Player)
        } else {
            false
        }
    }

    /// Score for popping this bubble now (fresh x2, nearly expired x3)
    pub fn score(&self) -> u32 {
        let base = self.kind.profile().score;
        let ratio = if self.max_age > 0.0 {
            self.age / self.max_age
        } else {
            0.5
        };
        if ratio < 0.1 {
            base * 2
        } else if ratio > 0.9 {
            base * 3
        } else {
            base
        }
    }

    pub fn queue_effect(&mut self, record: EffectRecord) {
        self.effects.push(record);
    }

    /// Drain pending effect records
    pub fn take_effects(&mut self) -> Vec<EffectRecord> {
        std::mem::take(&mut self.effects)
    }
}
