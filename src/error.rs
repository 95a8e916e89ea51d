//! Error types for the simulation core
//!
//! Only configuration and environment failures surface as errors. Malformed
//! per-call input (bad spawn type, bad position, zero forces) is sanitized
//! in place with a logged warning instead.

use thiserror::Error;

/// Invalid spawn policy or stage configuration. The previous policy is kept.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field `{0}`")]
    Missing(&'static str),

    #[error("field `{field}` must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("field `{field}` = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("unknown bubble type `{0}`")]
    UnknownBubbleType(String),

    #[error("unknown stage `{0}`")]
    UnknownStage(String),

    #[error("spawn roster is empty")]
    EmptyRoster,

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A required external collaborator is missing or unusable
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("play field size has not been provided")]
    MissingPlayField,

    #[error("play field size {width}x{height} is not usable")]
    InvalidPlayField { width: f32, height: f32 },
}

/// Umbrella error for simulation construction
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),
}
