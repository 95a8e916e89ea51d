//! Interfaces to the presentation layer and the player
//!
//! The simulation reports outcomes through `NotificationSink` and mutates the
//! player only through `PlayerHealth`. Both are implemented outside the core.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bubble::BubbleType;

/// Where player damage came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSource {
    /// A poison bubble was popped
    Poison,
    /// An explosive bubble went off
    Explosion,
    /// A bubble burst on its own
    Burst(BubbleType),
}

/// Callbacks for the presentation layer. All methods default to no-ops.
pub trait NotificationSink {
    fn on_special_effect(&mut self, _kind: BubbleType, _at: Vec2) {}
    fn on_damage_taken(&mut self, _amount: f32, _source: DamageSource) {}
    fn on_healed(&mut self, _amount: f32) {}
}

/// Opaque player health mutator
pub trait PlayerHealth {
    fn take_damage(&mut self, amount: f32);
    fn heal(&mut self, amount: f32);
}

/// Sink that drops every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {}

/// One recorded notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    SpecialEffect { kind: BubbleType, at: Vec2 },
    DamageTaken { amount: f32, source: DamageSource },
    Healed { amount: f32 },
}

/// Sink that keeps every notification in order (replays, tests, logging)
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    pub entries: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn special_effects(&self) -> impl Iterator<Item = (BubbleType, Vec2)> + '_ {
        self.entries.iter().filter_map(|n| match n {
            Notification::SpecialEffect { kind, at } => Some((*kind, *at)),
            _ => None,
        })
    }

    pub fn total_damage(&self) -> f32 {
        self.entries
            .iter()
            .map(|n| match n {
                Notification::DamageTaken { amount, .. } => *amount,
                _ => 0.0,
            })
            .sum()
    }
}

impl NotificationSink for NotificationLog {
    fn on_special_effect(&mut self, kind: BubbleType, at: Vec2) {
        self.entries.push(Notification::SpecialEffect { kind, at });
    }

    fn on_damage_taken(&mut self, amount: f32, source: DamageSource) {
        self.entries.push(Notification::DamageTaken { amount, source });
    }

    fn on_healed(&mut self, amount: f32) {
        self.entries.push(Notification::Healed { amount });
    }
}

/// Simple hit-point pool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerVitals {
    pub hp: f32,
    pub max_hp: f32,
}

impl PlayerVitals {
    pub fn new(max_hp: f32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }
}

impl Default for PlayerVitals {
    fn default() -> Self {
        Self::new(100.0)
    }
}

impl PlayerHealth for PlayerVitals {
    fn take_damage(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.hp = (self.hp - amount).max(0.0);
        }
    }

    fn heal(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.hp = (self.hp + amount).min(self.max_hp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vitals_clamp() {
        let mut vitals = PlayerVitals::new(50.0);
        vitals.take_damage(80.0);
        assert_eq!(vitals.hp, 0.0);
        assert!(vitals.is_dead());
        vitals.heal(200.0);
        assert_eq!(vitals.hp, 50.0);
        vitals.take_damage(f32::NAN);
        assert_eq!(vitals.hp, 50.0);
    }

    #[test]
    fn test_log_totals() {
        let mut log = NotificationLog::new();
        log.on_damage_taken(5.0, DamageSource::Poison);
        log.on_healed(3.0);
        log.on_damage_taken(2.5, DamageSource::Burst(BubbleType::Normal));
        log.on_special_effect(BubbleType::Spiky, Vec2::ONE);
        assert_eq!(log.total_damage(), 7.5);
        assert_eq!(log.special_effects().count(), 1);
    }
}
