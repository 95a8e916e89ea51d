//! Performance settings and quality presets
//!
//! The quality preset stretches the spawn interval and caps the number of
//! live bubbles; the frequency multiplier is an external throttle fed by
//! frame-time monitoring.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Multiplier applied to the base spawn interval (> 1 spawns less often)
    pub fn spawn_interval_stretch(&self) -> f32 {
        match self {
            QualityPreset::Low => 1.5,
            QualityPreset::Medium => 1.0,
            QualityPreset::High => 1.0,
        }
    }

    /// Hard ceiling on live bubbles regardless of stage policy
    pub fn max_bubble_ceiling(&self) -> usize {
        match self {
            QualityPreset::Low => 25,
            QualityPreset::Medium => 60,
            QualityPreset::High => 100,
        }
    }

    /// Whether per-tick continuous source effects (magnetic/frozen) run
    pub fn source_effects_enabled(&self) -> bool {
        match self {
            QualityPreset::Low => false,
            QualityPreset::Medium => true,
            QualityPreset::High => true,
        }
    }
}

/// Simulation performance settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Quality preset
    pub quality: QualityPreset,
    /// External spawn frequency throttle (1.0 = nominal)
    #[serde(default = "default_frequency")]
    pub frequency_multiplier: f32,
    /// Reduced motion (suppress screen shake records)
    #[serde(default)]
    pub reduced_motion: bool,
}

fn default_frequency() -> f32 {
    1.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            frequency_multiplier: 1.0,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Parse settings from JSON, sanitizing the frequency throttle
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.frequency_multiplier = sanitize_frequency(settings.frequency_multiplier);
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        !self.reduced_motion
    }
}

/// Clamp a throttle value into a usable range, falling back to 1.0
pub fn sanitize_frequency(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value.min(10.0)
    } else {
        log::warn!("Ignoring invalid frequency multiplier {value}, using 1.0");
        1.0
    }
}
