//! Drag and flick input
//!
//! Pointer down grabs the front-most bubble under the pointer, moves feed a
//! short sample history and release turns drag length plus release velocity
//! into a single launch impulse routed through `PhysicsEngine::apply_force`.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bubble::{Bubble, BubbleId};
use super::physics::PhysicsEngine;
use crate::consts::{DRAG_HISTORY_LEN, FLICK_BASE_FORCE, MIN_DRAG_DISTANCE};
use crate::direction_or;

/// Weights of drag direction vs release velocity in the launch
const DRAG_WEIGHT: f32 = 0.6;
const VELOCITY_WEIGHT: f32 = 0.4;
/// Caps on the two strength terms before weighting
const DISTANCE_TERM_CAP: f32 = 10.0;
const VELOCITY_TERM_CAP: f32 = 5.0;

/// Flick tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragSettings {
    /// Drags shorter than this are taps
    pub min_drag_distance: f32,
    pub history_len: usize,
    /// Scale from drag length to the distance term
    pub distance_scale: f32,
    /// Scale from release speed (units/s) to the velocity term
    pub velocity_scale: f32,
    pub base_force: f32,
    /// Floor on the time between the last two samples
    pub min_sample_dt_ms: f64,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            min_drag_distance: MIN_DRAG_DISTANCE,
            history_len: DRAG_HISTORY_LEN,
            distance_scale: 0.05,
            velocity_scale: 0.005,
            base_force: FLICK_BASE_FORCE,
            min_sample_dt_ms: 1.0,
        }
    }
}

/// One pointer sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSample {
    pub pos: Vec2,
    pub t_ms: f64,
}

/// An active drag
#[derive(Debug, Clone)]
pub struct DragSession {
    pub bubble: BubbleId,
    pub start: Vec2,
    pub current: Vec2,
    history: VecDeque<DragSample>,
}

impl DragSession {
    fn new(bubble: BubbleId, pos: Vec2, now_ms: f64) -> Self {
        let mut history = VecDeque::with_capacity(DRAG_HISTORY_LEN);
        history.push_back(DragSample { pos, t_ms: now_ms });
        Self {
            bubble,
            start: pos,
            current: pos,
            history,
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &DragSample> {
        self.history.iter()
    }

    pub fn sample_count(&self) -> usize {
        self.history.len()
    }

    /// Release velocity (units/s) from the two newest samples
    pub fn release_velocity(&self, min_dt_ms: f64) -> Vec2 {
        let n = self.history.len();
        if n < 2 {
            return Vec2::ZERO;
        }
        let (a, b) = (self.history[n - 2], self.history[n - 1]);
        let dt_secs = ((b.t_ms - a.t_ms).max(min_dt_ms) / 1000.0) as f32;
        (b.pos - a.pos) / dt_secs
    }
}

#[derive(Debug, Clone, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Outcome of releasing the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragRelease {
    /// Nothing was being dragged
    NotDragging,
    /// Dragged bubble died before release
    Lost(BubbleId),
    /// Too short to count as a drag
    Tap(BubbleId),
    /// Launch impulse applied
    Flick {
        bubble: BubbleId,
        direction: Vec2,
        strength: f32,
    },
    /// The physics engine refused the impulse
    Rejected(BubbleId),
}

/// Launch strength for a drag of `distance` released at `speed` (units/s)
pub fn flick_strength(distance: f32, speed: f32, settings: &DragSettings) -> f32 {
    let distance_term = (distance.max(0.0) * settings.distance_scale).min(DISTANCE_TERM_CAP);
    let velocity_term = (speed.max(0.0) * settings.velocity_scale).min(VELOCITY_TERM_CAP);
    (DRAG_WEIGHT * distance_term + VELOCITY_WEIGHT * velocity_term) * settings.base_force
}

#[derive(Debug, Clone, Default)]
pub struct DragSystem {
    settings: DragSettings,
    state: DragState,
}

impl DragSystem {
    pub fn new(settings: DragSettings) -> Self {
        Self {
            settings,
            state: DragState::Idle,
        }
    }

    pub fn settings(&self) -> &DragSettings {
        &self.settings
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Id of the grabbed bubble, if any
    pub fn dragged(&self) -> Option<BubbleId> {
        match &self.state {
            DragState::Dragging(session) => Some(session.bubble),
            DragState::Idle => None,
        }
    }

    /// Grab the front-most live bubble under `pos`
    pub fn on_drag_start(&mut self, bubbles: &[Bubble], pos: Vec2, now_ms: f64) -> Option<BubbleId> {
        // A new press always ends the previous drag
        self.state = DragState::Idle;
        if !pos.is_finite() {
            log::warn!("Ignoring drag start at non-finite {pos}");
            return None;
        }
        // Later bubbles draw on top
        let hit = bubbles
            .iter()
            .rev()
            .find(|b| b.is_alive() && b.contains_point(pos))?;
        log::trace!("Drag start on #{} at {pos}", hit.id);
        self.state = DragState::Dragging(DragSession::new(hit.id, pos, now_ms));
        Some(hit.id)
    }

    /// Record a pointer sample. Returns false when nothing is being dragged.
    pub fn on_drag_move(&mut self, pos: Vec2, now_ms: f64) -> bool {
        let DragState::Dragging(session) = &mut self.state else {
            return false;
        };
        if !pos.is_finite() {
            return false;
        }
        session.current = pos;
        session.history.push_back(DragSample { pos, t_ms: now_ms });
        while session.history.len() > self.settings.history_len.max(2) {
            session.history.pop_front();
        }
        true
    }

    /// Release the drag and launch the bubble
    pub fn on_drag_end(
        &mut self,
        start: Vec2,
        end: Vec2,
        bubbles: &mut [Bubble],
        physics: &mut PhysicsEngine,
    ) -> DragRelease {
        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return DragRelease::NotDragging;
        };
        let id = session.bubble;
        let Some(bubble) = bubbles.iter_mut().find(|b| b.id == id && b.is_alive()) else {
            log::trace!("Dragged bubble #{id} is gone");
            return DragRelease::Lost(id);
        };

        let drag = end - start;
        let distance = drag.length();
        if !distance.is_finite() || distance < self.settings.min_drag_distance {
            return DragRelease::Tap(id);
        }

        let drag_dir = drag / distance;
        let velocity = session.release_velocity(self.settings.min_sample_dt_ms);
        let blend = drag_dir * DRAG_WEIGHT + velocity.normalize_or_zero() * VELOCITY_WEIGHT;
        let direction = direction_or(Vec2::ZERO, blend, drag_dir);
        let strength = flick_strength(distance, velocity.length(), &self.settings);

        if physics.apply_force(bubble, direction, strength) {
            log::debug!("Flicked #{id} dir {direction} strength {strength:.1}");
            DragRelease::Flick {
                bubble: id,
                direction,
                strength,
            }
        } else {
            DragRelease::Rejected(id)
        }
    }

    /// Drop the drag without applying anything
    pub fn on_drag_cancel(&mut self) {
        if let DragState::Dragging(session) = std::mem::take(&mut self.state) {
            log::trace!("Drag on #{} cancelled", session.bubble);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bubble::{BubbleType, PopCause};
    use crate::sim::field::PlayField;
    use proptest::prelude::*;

    fn physics() -> PhysicsEngine {
        PhysicsEngine::new(PlayField::new(800.0, 600.0).unwrap())
    }

    fn bubbles() -> Vec<Bubble> {
        vec![
            Bubble::new(1, BubbleType::Normal, Vec2::new(400.0, 300.0)),
            Bubble::new(2, BubbleType::Normal, Vec2::new(420.0, 300.0)),
        ]
    }

    #[test]
    fn test_start_grabs_front_most() {
        let mut drag = DragSystem::default();
        let set = bubbles();
        assert_eq!(drag.on_drag_start(&set, Vec2::new(410.0, 300.0), 0.0), Some(2));
        assert_eq!(drag.dragged(), Some(2));
    }

    #[test]
    fn test_start_miss_stays_idle() {
        let mut drag = DragSystem::default();
        let mut set = bubbles();
        assert_eq!(drag.on_drag_start(&set, Vec2::new(10.0, 10.0), 0.0), None);
        assert!(!drag.is_dragging());

        set[1].terminate(PopCause::Player);
        assert_eq!(drag.on_drag_start(&set, Vec2::new(410.0, 300.0), 0.0), Some(1));
    }

    #[test]
    fn test_missed_press_drops_previous_drag() {
        let mut drag = DragSystem::default();
        let mut physics = physics();
        let mut set = bubbles();
        assert_eq!(drag.on_drag_start(&set, Vec2::new(400.0, 300.0), 0.0), Some(2));
        assert_eq!(drag.on_drag_start(&set, Vec2::new(10.0, 10.0), 16.0), None);
        assert!(!drag.is_dragging());

        let release = drag.on_drag_end(Vec2::new(10.0, 10.0), Vec2::new(300.0, 10.0), &mut set, &mut physics);
        assert_eq!(release, DragRelease::NotDragging);
        assert!(set.iter().all(|b| b.vel == Vec2::ZERO));
        assert_eq!(physics.performance_stats().total_forces, 0);
    }

    #[test]
    fn test_move_requires_drag() {
        let mut drag = DragSystem::default();
        assert!(!drag.on_drag_move(Vec2::new(1.0, 1.0), 5.0));
    }

    #[test]
    fn test_history_is_bounded() {
        let mut drag = DragSystem::default();
        drag.on_drag_start(&bubbles(), Vec2::new(400.0, 300.0), 0.0);
        for i in 1..=25 {
            assert!(drag.on_drag_move(Vec2::new(400.0 + i as f32, 300.0), i as f64 * 16.0));
        }
        let DragState::Dragging(session) = drag.state() else {
            panic!("expected an active drag");
        };
        assert_eq!(session.sample_count(), DRAG_HISTORY_LEN);
        assert_eq!(session.history().last().map(|s| s.pos.x), Some(425.0));
        assert_eq!(session.current, Vec2::new(425.0, 300.0));
    }

    #[test]
    fn test_short_drag_is_tap() {
        let mut drag = DragSystem::default();
        let mut physics = physics();
        let mut set = bubbles();
        drag.on_drag_start(&set, Vec2::new(400.0, 300.0), 0.0);
        drag.on_drag_move(Vec2::new(410.0, 300.0), 16.0);

        let release = drag.on_drag_end(Vec2::new(400.0, 300.0), Vec2::new(410.0, 300.0), &mut set, &mut physics);
        assert_eq!(release, DragRelease::Tap(2));
        assert!(set.iter().all(|b| b.vel == Vec2::ZERO));
        assert!(!drag.is_dragging());
        assert_eq!(physics.performance_stats().total_forces, 0);
    }

    #[test]
    fn test_flick_launches_along_drag() {
        let mut drag = DragSystem::default();
        let mut physics = physics();
        let mut set = vec![Bubble::new(1, BubbleType::Normal, Vec2::new(400.0, 300.0))];
        drag.on_drag_start(&set, Vec2::new(400.0, 300.0), 0.0);
        drag.on_drag_move(Vec2::new(420.0, 300.0), 16.0);
        drag.on_drag_move(Vec2::new(460.0, 300.0), 32.0);

        let release = drag.on_drag_end(Vec2::new(400.0, 300.0), Vec2::new(460.0, 300.0), &mut set, &mut physics);
        // distance term 60 * 0.05 = 3, velocity 2500 u/s caps at 5
        let expected = (0.6 * 3.0 + 0.4 * 5.0) * FLICK_BASE_FORCE;
        match release {
            DragRelease::Flick { bubble, direction, strength } => {
                assert_eq!(bubble, 1);
                assert!((direction - Vec2::X).length() < 1e-5);
                assert!((strength - expected).abs() < 1e-3);
            }
            other => panic!("expected flick, got {other:?}"),
        }
        assert!((set[0].vel.x - expected).abs() < 1e-3);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_lost_and_cancelled_drags() {
        let mut drag = DragSystem::default();
        let mut physics = physics();
        let mut set = bubbles();
        drag.on_drag_start(&set, Vec2::new(400.0, 300.0), 0.0);
        set[1].terminate(PopCause::Chain);
        let release = drag.on_drag_end(Vec2::new(400.0, 300.0), Vec2::new(500.0, 300.0), &mut set, &mut physics);
        assert_eq!(release, DragRelease::Lost(2));

        drag.on_drag_start(&set, Vec2::new(400.0, 300.0), 0.0);
        drag.on_drag_cancel();
        assert!(!drag.is_dragging());
        let release = drag.on_drag_end(Vec2::new(400.0, 300.0), Vec2::new(500.0, 300.0), &mut set, &mut physics);
        assert_eq!(release, DragRelease::NotDragging);
        assert_eq!(set[0].vel, Vec2::ZERO);
    }

    proptest! {
        #[test]
        fn prop_flick_strength_monotone_in_distance(
            a in 0.0f32..2000.0,
            b in 0.0f32..2000.0,
            speed in 0.0f32..5000.0,
        ) {
            let settings = DragSettings::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(flick_strength(lo, speed, &settings) <= flick_strength(hi, speed, &settings));
        }
    }
}
