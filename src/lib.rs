//! Bubble Burst - real-time simulation core for a 2D bubble popping game
//!
//! Core modules:
//! - `sim`: Simulation (spawning, physics, drag/flick input, special effects)
//! - `render`: GPU-ready instance data handed to an external renderer
//! - `settings`: Quality presets and performance throttles
//! - `stages`: Data-driven stage spawn rosters
//! - `error`: Configuration and environment error types

pub mod error;
pub mod render;
pub mod settings;
pub mod sim;
pub mod stages;

pub use error::{ConfigError, EnvironmentError, SimError};
pub use settings::{QualityPreset, Settings};
pub use stages::StagePreset;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame time in milliseconds (60 Hz)
    pub const FRAME_DT_MS: f32 = 1000.0 / 60.0;
    /// Largest frame delta accepted by the frame driver (prevents tunnelling after a stall)
    pub const MAX_FRAME_DT_MS: f32 = 100.0;

    /// Default play field
    pub const DEFAULT_FIELD_WIDTH: f32 = 800.0;
    pub const DEFAULT_FIELD_HEIGHT: f32 = 600.0;

    /// Inset used when drawing random spawn positions
    pub const SPAWN_MARGIN: f32 = 50.0;
    /// Initial drift speed range for freshly spawned bubbles (units/s)
    pub const SPAWN_MIN_SPEED: f32 = 15.0;
    pub const SPAWN_MAX_SPEED: f32 = 60.0;

    /// Default spawn policy
    pub const DEFAULT_MAX_BUBBLES: usize = 30;
    pub const DEFAULT_SPAWN_INTERVAL_MS: f32 = 1000.0;

    /// Physics defaults
    pub const GRAVITY: f32 = 60.0;
    pub const FRICTION: f32 = 0.98;
    pub const BOUNCE: f32 = 0.7;
    pub const MAX_SPEED: f32 = 800.0;
    pub const MIN_SPEED: f32 = 1.0;

    /// Escaping bubbles steer away from the pointer inside this radius
    pub const ESCAPE_RADIUS: f32 = 90.0;
    pub const ESCAPE_STRENGTH: f32 = 720.0;

    /// Continuous source effects (per second)
    pub const MAGNETIC_RADIUS: f32 = 100.0;
    pub const MAGNETIC_STRENGTH: f32 = 150.0;
    pub const FROZEN_RADIUS: f32 = 120.0;
    pub const FROZEN_DAMPING: f32 = 0.5;

    /// Drag/flick tuning
    pub const DRAG_HISTORY_LEN: usize = 10;
    pub const MIN_DRAG_DISTANCE: f32 = 15.0;
    pub const FLICK_BASE_FORCE: f32 = 60.0;

    /// Fallback damage for bubbles missing from the burst damage table
    pub const DEFAULT_BURST_DAMAGE: f32 = 5.0;
}

/// Unit vector from `from` toward `to`, or `fallback` when the points coincide
#[inline]
pub fn direction_or(from: Vec2, to: Vec2, fallback: Vec2) -> Vec2 {
    let delta = to - from;
    let len = delta.length();
    if len < 1e-4 || !len.is_finite() {
        fallback
    } else {
        delta / len
    }
}

/// Rescale `v` so its length never exceeds `max`
#[inline]
pub fn clamp_speed(v: Vec2, max: f32) -> Vec2 {
    let speed = v.length();
    if !speed.is_finite() {
        // Squared length overflowed; rescale by the largest component first
        let largest = v.abs().max_element();
        return if largest.is_finite() && largest > 0.0 {
            (v / largest).normalize_or_zero() * max
        } else {
            Vec2::ZERO
        };
    }
    if speed > max && speed > 0.0 {
        v * (max / speed)
    } else {
        v
    }
}

/// Convert a millisecond frame delta into seconds
#[inline]
pub fn ms_to_secs(dt_ms: f32) -> f32 {
    dt_ms / 1000.0
}
