//! Bubble kinematics, boundary bounces and pairwise collision response
//!
//! One shared integrator for every bubble. Escaping bubbles add a steering
//! acceleration away from the pointer before the common step. Collision
//! response swaps velocities scaled by the bounce coefficient; it is not
//! mass-weighted and does not conserve momentum (tuned for game feel).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bubble::{Bubble, BubbleId, MotionState};
use super::field::PlayField;
use crate::consts::*;
use crate::{clamp_speed, direction_or, ms_to_secs};

/// Tunable physics parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSettings {
    /// Downward acceleration applied only while moving upward (units/s²)
    pub gravity: f32,
    /// Per-tick velocity damping factor (< 1)
    pub friction: f32,
    /// Velocity retained on wall/bubble bounce (< 1)
    pub bounce: f32,
    pub max_speed: f32,
    /// Speeds below this snap to zero
    pub min_speed: f32,
    pub escape_radius: f32,
    pub escape_strength: f32,
    pub magnetic_radius: f32,
    pub magnetic_strength: f32,
    pub frozen_radius: f32,
    /// Fraction of velocity removed per second near a frozen bubble
    pub frozen_damping: f32,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: FRICTION,
            bounce: BOUNCE,
            max_speed: MAX_SPEED,
            min_speed: MIN_SPEED,
            escape_radius: ESCAPE_RADIUS,
            escape_strength: ESCAPE_STRENGTH,
            magnetic_radius: MAGNETIC_RADIUS,
            magnetic_strength: MAGNETIC_STRENGTH,
            frozen_radius: FROZEN_RADIUS,
            frozen_damping: FROZEN_DAMPING,
        }
    }
}

/// Partial settings update; absent fields are left alone
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PhysicsSettingsUpdate {
    pub gravity: Option<f32>,
    pub friction: Option<f32>,
    pub bounce: Option<f32>,
}

/// Diagnostic counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    /// Collisions resolved by the last `resolve_collisions` pass
    pub active_collisions: u32,
    /// Forces applied since creation
    pub total_forces: u64,
    /// Mean speed of live bubbles at the last collision pass
    pub average_speed: f32,
}

/// Add an attraction toward `center` to every live bubble within `radius`
///
/// `impulse` is the velocity change at full strength (already scaled by dt).
/// Returns the number of bubbles affected.
pub fn attract_within(
    bubbles: &mut [Bubble],
    center: Vec2,
    radius: f32,
    impulse: f32,
    exclude: Option<BubbleId>,
) -> usize {
    let mut affected = 0;
    for bubble in bubbles.iter_mut() {
        if !bubble.is_alive() || Some(bubble.id) == exclude {
            continue;
        }
        let dist = bubble.pos.distance(center);
        // Bubbles sitting on the source have no defined pull direction
        if dist >= radius || dist < 1e-4 {
            continue;
        }
        bubble.vel += (center - bubble.pos) / dist * impulse;
        affected += 1;
    }
    affected
}

/// Per-bubble integrator and collision solver
#[derive(Debug, Clone)]
pub struct PhysicsEngine {
    settings: PhysicsSettings,
    field: PlayField,
    /// Point escaping bubbles flee from (usually the pointer)
    repulsion_point: Option<Vec2>,
    stats: PerformanceStats,
}

impl PhysicsEngine {
    pub fn new(field: PlayField) -> Self {
        Self::with_settings(field, PhysicsSettings::default())
    }

    pub fn with_settings(field: PlayField, settings: PhysicsSettings) -> Self {
        Self {
            settings,
            field,
            repulsion_point: None,
            stats: PerformanceStats::default(),
        }
    }

    pub fn settings(&self) -> &PhysicsSettings {
        &self.settings
    }

    pub fn field(&self) -> PlayField {
        self.field
    }

    pub fn set_field(&mut self, field: PlayField) {
        self.field = field;
    }

    pub fn set_repulsion_point(&mut self, point: Option<Vec2>) {
        self.repulsion_point = point.filter(|p| p.is_finite());
    }

    /// Apply a partial update, ignoring out-of-range values
    pub fn update_settings(&mut self, update: &PhysicsSettingsUpdate) {
        if let Some(gravity) = update.gravity {
            if gravity.is_finite() {
                self.settings.gravity = gravity;
            } else {
                log::warn!("Ignoring non-finite gravity {gravity}");
            }
        }
        if let Some(friction) = update.friction {
            if friction > 0.0 && friction <= 1.0 {
                self.settings.friction = friction;
            } else {
                log::warn!("Ignoring friction {friction} outside (0, 1]");
            }
        }
        if let Some(bounce) = update.bounce {
            if (0.0..=1.0).contains(&bounce) {
                self.settings.bounce = bounce;
            } else {
                log::warn!("Ignoring bounce {bounce} outside [0, 1]");
            }
        }
        log::debug!("Physics settings now {:?}", self.settings);
    }

    pub fn performance_stats(&self) -> PerformanceStats {
        self.stats
    }

    /// Advance one bubble by `dt_ms`
    pub fn update(&mut self, bubble: &mut Bubble, dt_ms: f32, now_ms: f64) {
        if !bubble.is_alive() {
            log::trace!("update on dead bubble #{}", bubble.id);
            return;
        }
        if !dt_ms.is_finite() || dt_ms < 0.0 {
            log::warn!("Ignoring invalid frame delta {dt_ms}");
            return;
        }
        let dt = ms_to_secs(dt_ms);
        let s = self.settings;

        bubble.age += dt_ms;

        // Steer away from the pointer
        if bubble.motion_state() == MotionState::Escaping {
            if let Some(point) = self.repulsion_point {
                let dist = bubble.pos.distance(point);
                if dist < s.escape_radius {
                    let away = direction_or(point, bubble.pos, Vec2::X);
                    let falloff = 1.0 - dist / s.escape_radius;
                    bubble.vel += away * s.escape_strength * falloff * dt;
                }
            }
        }

        // Buoyancy only counteracts upward motion
        if bubble.vel.y < 0.0 {
            bubble.vel.y += s.gravity * dt;
        }

        bubble.vel *= s.friction;
        if bubble.vel.length() < s.min_speed {
            bubble.vel = Vec2::ZERO;
        }

        bubble.pos += bubble.vel * dt;
        self.resolve_boundary(bubble);

        if let Some(modifier) = bubble.modifier {
            if modifier.is_active(now_ms) {
                bubble.vel *= modifier.factor;
            } else {
                bubble.modifier = None;
            }
        }
    }

    /// Clamp to the field and reflect the crossing component.
    /// Returns true if any wall was hit.
    pub fn resolve_boundary(&self, bubble: &mut Bubble) -> bool {
        let r = bubble.radius();
        let bounce = self.settings.bounce;
        let mut hit = false;

        if bubble.pos.x - r < 0.0 {
            bubble.pos.x = r;
            if bubble.vel.x < 0.0 {
                bubble.vel.x = -bubble.vel.x * bounce;
            }
            hit = true;
        } else if bubble.pos.x + r > self.field.width {
            bubble.pos.x = self.field.width - r;
            if bubble.vel.x > 0.0 {
                bubble.vel.x = -bubble.vel.x * bounce;
            }
            hit = true;
        }

        if bubble.pos.y - r < 0.0 {
            bubble.pos.y = r;
            if bubble.vel.y < 0.0 {
                bubble.vel.y = -bubble.vel.y * bounce;
            }
            hit = true;
        } else if bubble.pos.y + r > self.field.height {
            bubble.pos.y = self.field.height - r;
            if bubble.vel.y > 0.0 {
                bubble.vel.y = -bubble.vel.y * bounce;
            }
            hit = true;
        }

        hit
    }

    /// Add `direction * magnitude` to the velocity and clamp to max speed.
    /// Returns false when the force was rejected.
    pub fn apply_force(&mut self, bubble: &mut Bubble, direction: Vec2, magnitude: f32) -> bool {
        if !bubble.is_alive() {
            return false;
        }
        if !direction.is_finite() || !magnitude.is_finite() || magnitude < 0.0 {
            log::warn!("Rejected malformed force {direction} x {magnitude}");
            return false;
        }
        let len = direction.length();
        if len < 1e-6 {
            log::trace!("zero-length force on bubble #{}", bubble.id);
            return false;
        }
        // Anything past this already saturates the cap along `direction`
        let max = self.settings.max_speed;
        let magnitude = magnitude.min(bubble.vel.length() + 2.0 * max);
        bubble.vel = clamp_speed(bubble.vel + direction / len * magnitude, max);
        self.stats.total_forces += 1;
        true
    }

    /// Pairwise overlap resolution. Returns the number of colliding pairs.
    pub fn resolve_collisions(&mut self, bubbles: &mut [Bubble]) -> u32 {
        let bounce = self.settings.bounce;
        let mut collisions = 0;

        for i in 0..bubbles.len() {
            let (head, tail) = bubbles.split_at_mut(i + 1);
            let a = &mut head[i];
            if !a.is_alive() {
                continue;
            }
            for b in tail.iter_mut() {
                if !b.is_alive() {
                    continue;
                }
                let min_dist = a.radius() + b.radius();
                let dist = a.pos.distance(b.pos);
                if dist >= min_dist {
                    continue;
                }
                let normal = direction_or(a.pos, b.pos, Vec2::X);
                let half_overlap = (min_dist - dist) * 0.5;
                a.pos -= normal * half_overlap;
                b.pos += normal * half_overlap;

                let va = a.vel;
                a.vel = b.vel * bounce;
                b.vel = va * bounce;
                // Separation may push a bubble through a wall
                self.resolve_boundary(a);
                self.resolve_boundary(b);
                collisions += 1;
            }
        }

        let (count, total_speed) = bubbles
            .iter()
            .filter(|b| b.is_alive())
            .fold((0u32, 0.0f32), |(n, sum), b| (n + 1, sum + b.vel.length()));
        self.stats.active_collisions = collisions;
        self.stats.average_speed = if count > 0 {
            total_speed / count as f32
        } else {
            0.0
        };
        collisions
    }

    /// Continuous pull toward a live magnetic bubble, one tick's worth
    pub fn apply_magnetic_effect(
        &self,
        source: BubbleId,
        bubbles: &mut [Bubble],
        dt_ms: f32,
    ) -> usize {
        let Some(center) = live_position(bubbles, source) else {
            return 0;
        };
        let impulse = self.settings.magnetic_strength * ms_to_secs(dt_ms);
        attract_within(
            bubbles,
            center,
            self.settings.magnetic_radius,
            impulse,
            Some(source),
        )
    }

    /// Continuous damping around a live frozen bubble, one tick's worth
    pub fn apply_frozen_effect(&self, source: BubbleId, bubbles: &mut [Bubble], dt_ms: f32) -> usize {
        let Some(center) = live_position(bubbles, source) else {
            return 0;
        };
        let keep = (1.0 - self.settings.frozen_damping * ms_to_secs(dt_ms)).clamp(0.0, 1.0);
        let radius = self.settings.frozen_radius;
        let mut affected = 0;
        for bubble in bubbles.iter_mut() {
            if bubble.id == source || !bubble.is_alive() {
                continue;
            }
            if bubble.pos.distance(center) < radius {
                bubble.vel *= keep;
                affected += 1;
            }
        }
        affected
    }
}

fn live_position(bubbles: &[Bubble], id: BubbleId) -> Option<Vec2> {
    bubbles
        .iter()
        .find(|b| b.id == id && b.is_alive())
        .map(|b| b.pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bubble::{BubbleType, PopCause, SlowModifier};
    use proptest::prelude::*;

    fn engine() -> PhysicsEngine {
        PhysicsEngine::new(PlayField::new(800.0, 600.0).unwrap())
    }

    fn bubble_at(id: BubbleId, kind: BubbleType, x: f32, y: f32) -> Bubble {
        Bubble::new(id, kind, Vec2::new(x, y))
    }

    #[test]
    fn test_update_integrates_and_damps() {
        let mut engine = engine();
        let mut bubble = bubble_at(1, BubbleType::Normal, 400.0, 300.0);
        bubble.vel = Vec2::new(100.0, 0.0);

        engine.update(&mut bubble, 1000.0, 0.0);
        assert!((bubble.vel.x - 98.0).abs() < 1e-3);
        assert!((bubble.pos.x - 498.0).abs() < 1e-3);
        assert_eq!(bubble.age, 1000.0);
    }

    #[test]
    fn test_buoyancy_only_opposes_upward_motion() {
        let mut engine = engine();
        let mut rising = bubble_at(1, BubbleType::Normal, 400.0, 300.0);
        rising.vel = Vec2::new(0.0, -100.0);
        let mut sinking = bubble_at(2, BubbleType::Normal, 400.0, 300.0);
        sinking.vel = Vec2::new(0.0, 100.0);

        engine.update(&mut rising, 100.0, 0.0);
        engine.update(&mut sinking, 100.0, 0.0);
        // -100 + 60 * 0.1 = -94, then friction
        assert!((rising.vel.y - (-94.0 * 0.98)).abs() < 1e-3);
        assert!((sinking.vel.y - 98.0).abs() < 1e-3);
    }

    #[test]
    fn test_tiny_speed_snaps_to_zero() {
        let mut engine = engine();
        let mut bubble = bubble_at(1, BubbleType::Normal, 400.0, 300.0);
        bubble.vel = Vec2::new(0.5, 0.0);
        engine.update(&mut bubble, 16.0, 0.0);
        assert_eq!(bubble.vel, Vec2::ZERO);
        assert_eq!(bubble.pos, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_boundary_bounce() {
        let mut engine = engine();
        let mut bubble = bubble_at(1, BubbleType::Normal, 790.0, 300.0);
        bubble.vel = Vec2::new(200.0, 0.0);
        engine.update(&mut bubble, 16.0, 0.0);

        assert_eq!(bubble.pos.x, 800.0 - bubble.radius());
        assert!(bubble.vel.x < 0.0);
        assert!((bubble.vel.x + 200.0 * 0.98 * 0.7).abs() < 1e-3);
    }

    #[test]
    fn test_escaping_flees_pointer() {
        let mut engine = engine();
        engine.set_repulsion_point(Some(Vec2::new(380.0, 300.0)));
        let mut escaping = bubble_at(1, BubbleType::Escaping, 400.0, 300.0);
        let mut normal = bubble_at(2, BubbleType::Normal, 400.0, 300.0);

        engine.update(&mut escaping, 16.0, 0.0);
        engine.update(&mut normal, 16.0, 0.0);
        assert!(escaping.vel.x > 0.0);
        assert!(escaping.pos.x > 400.0);
        assert_eq!(normal.vel, Vec2::ZERO);

        // Out of range: no steering
        engine.set_repulsion_point(Some(Vec2::new(100.0, 100.0)));
        let mut far = bubble_at(3, BubbleType::Escaping, 400.0, 300.0);
        engine.update(&mut far, 16.0, 0.0);
        assert_eq!(far.vel, Vec2::ZERO);
    }

    #[test]
    fn test_slow_modifier_applies_until_expiry() {
        let mut engine = engine();
        let mut slowed = bubble_at(1, BubbleType::Normal, 400.0, 300.0);
        slowed.vel = Vec2::new(100.0, 0.0);
        slowed.modifier = Some(SlowModifier {
            factor: 0.5,
            expires_at_ms: 1000.0,
        });
        let mut control = slowed.clone();
        control.modifier = None;

        engine.update(&mut slowed, 16.0, 500.0);
        engine.update(&mut control, 16.0, 500.0);
        assert!((slowed.vel.x - control.vel.x * 0.5).abs() < 1e-4);
        assert!(slowed.modifier.is_some());

        engine.update(&mut slowed, 16.0, 1000.0);
        assert!(slowed.modifier.is_none());
    }

    #[test]
    fn test_dead_bubble_is_untouched() {
        let mut engine = engine();
        let mut bubble = bubble_at(1, BubbleType::Normal, 400.0, 300.0);
        bubble.vel = Vec2::new(50.0, 0.0);
        bubble.terminate(PopCause::Player);
        let before = bubble.clone();

        engine.update(&mut bubble, 16.0, 0.0);
        assert!(!engine.apply_force(&mut bubble, Vec2::X, 100.0));
        assert_eq!(bubble.pos, before.pos);
        assert_eq!(bubble.vel, before.vel);
        assert_eq!(bubble.age, before.age);
    }

    #[test]
    fn test_apply_force_rejects_degenerate_input() {
        let mut engine = engine();
        let mut bubble = bubble_at(1, BubbleType::Normal, 400.0, 300.0);
        assert!(!engine.apply_force(&mut bubble, Vec2::ZERO, 100.0));
        assert!(!engine.apply_force(&mut bubble, Vec2::new(f32::NAN, 0.0), 100.0));
        assert!(!engine.apply_force(&mut bubble, Vec2::X, f32::INFINITY));
        assert!(!engine.apply_force(&mut bubble, Vec2::X, -5.0));
        assert_eq!(bubble.vel, Vec2::ZERO);
        assert_eq!(engine.performance_stats().total_forces, 0);

        assert!(engine.apply_force(&mut bubble, Vec2::new(0.0, 2.0), 100.0));
        assert!((bubble.vel - Vec2::new(0.0, 100.0)).length() < 1e-4);
        assert_eq!(engine.performance_stats().total_forces, 1);
    }

    #[test]
    fn test_huge_force_saturates_along_direction() {
        let mut engine = engine();
        let mut bubble = bubble_at(1, BubbleType::Normal, 400.0, 300.0);
        bubble.vel = Vec2::new(10.0, 0.0);
        assert!(engine.apply_force(&mut bubble, Vec2::X, 1e20));
        assert!((bubble.vel - Vec2::new(MAX_SPEED, 0.0)).length() < 1e-2);

        bubble.vel = Vec2::new(-MAX_SPEED, 0.0);
        assert!(engine.apply_force(&mut bubble, Vec2::X, f32::MAX));
        assert!((bubble.vel - Vec2::new(MAX_SPEED, 0.0)).length() < 1e-2);
    }

    #[test]
    fn test_collision_near_wall_stays_in_field() {
        let mut engine = engine();
        let mut bubbles = vec![
            bubble_at(1, BubbleType::Normal, 30.0, 300.0),
            bubble_at(2, BubbleType::Normal, 50.0, 300.0),
        ];
        assert_eq!(engine.resolve_collisions(&mut bubbles), 1);
        assert_eq!(bubbles[0].pos.x, bubbles[0].radius());
        assert!((bubbles[1].pos.x - 65.0).abs() < 1e-3);
    }

    #[test]
    fn test_collision_separates_and_swaps() {
        let mut engine = engine();
        let mut bubbles = vec![
            bubble_at(1, BubbleType::Normal, 400.0, 300.0),
            bubble_at(2, BubbleType::Normal, 440.0, 300.0),
        ];
        bubbles[0].vel = Vec2::new(100.0, 0.0);
        bubbles[1].vel = Vec2::new(-50.0, 0.0);

        assert_eq!(engine.resolve_collisions(&mut bubbles), 1);
        assert!((bubbles[0].pos.x - 395.0).abs() < 1e-3);
        assert!((bubbles[1].pos.x - 445.0).abs() < 1e-3);
        assert!((bubbles[0].vel.x + 35.0).abs() < 1e-3);
        assert!((bubbles[1].vel.x - 70.0).abs() < 1e-3);

        let stats = engine.performance_stats();
        assert_eq!(stats.active_collisions, 1);
        assert!((stats.average_speed - 52.5).abs() < 1e-3);
    }

    #[test]
    fn test_collision_ignores_dead() {
        let mut engine = engine();
        let mut bubbles = vec![
            bubble_at(1, BubbleType::Normal, 400.0, 300.0),
            bubble_at(2, BubbleType::Normal, 410.0, 300.0),
        ];
        bubbles[1].terminate(PopCause::Chain);
        assert_eq!(engine.resolve_collisions(&mut bubbles), 0);
        assert_eq!(bubbles[1].pos, Vec2::new(410.0, 300.0));
    }

    #[test]
    fn test_coincident_centers_stay_finite() {
        let mut engine = engine();
        let mut bubbles = vec![
            bubble_at(1, BubbleType::Normal, 400.0, 300.0),
            bubble_at(2, BubbleType::Normal, 400.0, 300.0),
        ];
        engine.resolve_collisions(&mut bubbles);
        assert!(bubbles.iter().all(|b| b.pos.is_finite() && b.vel.is_finite()));
        assert_ne!(bubbles[0].pos, bubbles[1].pos);
    }

    #[test]
    fn test_magnetic_effect_pulls_in_range_only() {
        let engine = engine();
        let mut bubbles = vec![
            bubble_at(1, BubbleType::Magnetic, 0.0, 0.0),
            bubble_at(2, BubbleType::Normal, 50.0, 0.0),
            bubble_at(3, BubbleType::Normal, 500.0, 0.0),
        ];
        let affected = engine.apply_magnetic_effect(1, &mut bubbles, 16.0);
        assert_eq!(affected, 1);
        assert!(bubbles[1].vel.x < 0.0);
        assert_eq!(bubbles[2].vel, Vec2::ZERO);
        assert_eq!(bubbles[0].vel, Vec2::ZERO);
    }

    #[test]
    fn test_frozen_effect_damps_neighbors() {
        let engine = engine();
        let mut bubbles = vec![
            bubble_at(1, BubbleType::Frozen, 400.0, 300.0),
            bubble_at(2, BubbleType::Normal, 450.0, 300.0),
            bubble_at(3, BubbleType::Normal, 700.0, 300.0),
        ];
        bubbles[1].vel = Vec2::new(100.0, 0.0);
        bubbles[2].vel = Vec2::new(100.0, 0.0);

        assert_eq!(engine.apply_frozen_effect(1, &mut bubbles, 100.0), 1);
        assert!((bubbles[1].vel.x - 95.0).abs() < 1e-3);
        assert_eq!(bubbles[2].vel.x, 100.0);
    }

    #[test]
    fn test_source_effects_need_live_source() {
        let engine = engine();
        let mut bubbles = vec![
            bubble_at(1, BubbleType::Magnetic, 0.0, 0.0),
            bubble_at(2, BubbleType::Normal, 50.0, 0.0),
        ];
        bubbles[0].terminate(PopCause::Player);
        assert_eq!(engine.apply_magnetic_effect(1, &mut bubbles, 16.0), 0);
        assert_eq!(engine.apply_frozen_effect(1, &mut bubbles, 16.0), 0);
        assert_eq!(bubbles[1].vel, Vec2::ZERO);
    }

    #[test]
    fn test_update_settings_validates() {
        let mut engine = engine();
        engine.update_settings(&PhysicsSettingsUpdate {
            gravity: Some(10.0),
            friction: Some(1.5),
            bounce: Some(0.5),
        });
        assert_eq!(engine.settings().gravity, 10.0);
        assert_eq!(engine.settings().friction, FRICTION);
        assert_eq!(engine.settings().bounce, 0.5);
    }

    proptest! {
        #[test]
        fn prop_apply_force_never_exceeds_cap(
            vx in -2000.0f32..2000.0,
            vy in -2000.0f32..2000.0,
            angle in 0.0f32..std::f32::consts::TAU,
            magnitude in prop_oneof![0.0f32..1e4, 1e4f32..f32::MAX],
            repeats in 1usize..5,
        ) {
            let mut engine = engine();
            let mut bubble = bubble_at(1, BubbleType::Normal, 400.0, 300.0);
            bubble.vel = Vec2::new(vx, vy);
            let direction = Vec2::from_angle(angle);
            for _ in 0..repeats {
                prop_assert!(engine.apply_force(&mut bubble, direction, magnitude));
                prop_assert!(bubble.vel.length() <= MAX_SPEED * (1.0 + 1e-5));
                prop_assert!(bubble.vel.is_finite());
                if magnitude >= 1e4 {
                    // Strong enough to override any starting velocity
                    prop_assert!(bubble.vel.dot(direction) > 0.0);
                }
            }
        }

        #[test]
        fn prop_collisions_keep_count_and_finite(
            coords in proptest::collection::vec((0.0f32..800.0, 0.0f32..600.0, -500.0f32..500.0, -500.0f32..500.0), 2..40),
        ) {
            let mut engine = engine();
            let mut bubbles: Vec<Bubble> = coords
                .iter()
                .enumerate()
                .map(|(i, &(x, y, vx, vy))| {
                    let mut b = bubble_at(i as BubbleId + 1, BubbleType::Normal, x, y);
                    b.vel = Vec2::new(vx, vy);
                    b
                })
                .collect();
            let count = bubbles.len();
            engine.resolve_collisions(&mut bubbles);
            prop_assert_eq!(bubbles.len(), count);
            for b in &bubbles {
                prop_assert!(b.pos.is_finite());
                prop_assert!(b.vel.is_finite());
            }
        }
    }
}
