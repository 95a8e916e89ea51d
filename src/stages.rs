//! Stage presets
//!
//! A stage is a spawn roster plus a rate and a population cap. Rosters may
//! repeat a type to weight the uniform pick toward it.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::bubble::BubbleType;
use crate::sim::spawner::{SpawnConfig, TypeChance};

/// Accepted spawn rates (bubbles per second)
pub const SPAWN_RATE_RANGE: (f64, f64) = (0.1, 10.0);
/// Accepted population caps
pub const MAX_BUBBLES_RANGE: (f64, f64) = (5.0, 100.0);

/// Built-in stage ids
pub const BUILTIN_STAGES: [&str; 7] = [
    "normal",
    "golden_rush",
    "phantom_night",
    "explosive_chaos",
    "speed_challenge",
    "frozen_lake",
    "all_stars",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagePreset {
    pub id: String,
    pub bubble_types: Vec<String>,
    /// Bubbles per second
    pub spawn_rate: f64,
    pub max_bubbles: f64,
    #[serde(default)]
    pub type_chances: Vec<TypeChance>,
    /// Score multiplier for bubbles popped by a chain or explosion
    #[serde(default)]
    pub chain_bonus: Option<f32>,
}

fn roster(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn chance(kind: &str, probability: f64) -> Vec<TypeChance> {
    vec![TypeChance {
        kind: kind.to_string(),
        probability,
    }]
}

fn check_range(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

impl StagePreset {
    fn new(id: &str, types: &[&str], spawn_rate: f64, max_bubbles: f64) -> Self {
        Self {
            id: id.to_string(),
            bubble_types: roster(types),
            spawn_rate,
            max_bubbles,
            type_chances: Vec::new(),
            chain_bonus: None,
        }
    }

    /// Look up a built-in stage. Dashes and case are ignored.
    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        let id = name.trim().to_lowercase().replace('-', "_");
        let preset = match id.as_str() {
            "normal" => Self::new("normal", &["normal", "stone", "rainbow"], 1.5, 30.0),
            "golden_rush" => Self {
                type_chances: chance("golden", 0.4),
                ..Self::new(
                    "golden_rush",
                    &["normal", "stone", "golden", "golden", "golden", "rainbow", "pink"],
                    2.0,
                    25.0,
                )
            },
            "phantom_night" => Self {
                type_chances: chance("phantom", 0.5),
                ..Self::new(
                    "phantom_night",
                    &["normal", "phantom", "phantom", "phantom", "electric", "poison"],
                    2.2,
                    30.0,
                )
            },
            "explosive_chaos" => Self {
                type_chances: chance("explosive", 0.6),
                chain_bonus: Some(3.0),
                ..Self::new(
                    "explosive_chaos",
                    &["normal", "explosive", "explosive", "spiky", "boss"],
                    1.8,
                    20.0,
                )
            },
            "speed_challenge" => {
                Self::new("speed_challenge", &["normal", "stone", "escaping"], 3.5, 50.0)
            }
            "frozen_lake" => Self::new(
                "frozen_lake",
                &["normal", "frozen", "frozen", "diamond", "clock", "boss"],
                1.6,
                22.0,
            ),
            "all_stars" => {
                let all: Vec<&str> = BubbleType::ALL.iter().map(|t| t.as_str()).collect();
                Self::new("all_stars", &all, 3.0, 40.0)
            }
            _ => return Err(ConfigError::UnknownStage(name.to_string())),
        };
        Ok(preset)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let preset: StagePreset = serde_json::from_str(json)?;
        preset.validate()?;
        Ok(preset)
    }

    /// Range-check rate, cap, roster and chain bonus
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("spawn_rate", self.spawn_rate, SPAWN_RATE_RANGE)?;
        check_range("max_bubbles", self.max_bubbles, MAX_BUBBLES_RANGE)?;
        if self.bubble_types.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        if let Some(bonus) = self.chain_bonus {
            if !bonus.is_finite() || bonus <= 0.0 {
                return Err(ConfigError::NotPositive {
                    field: "chain_bonus",
                    value: bonus as f64,
                });
            }
        }
        Ok(())
    }

    /// Spawn configuration for this stage
    pub fn spawn_config(&self) -> Result<SpawnConfig, ConfigError> {
        self.validate()?;
        Ok(SpawnConfig {
            max_bubbles: Some(self.max_bubbles),
            spawn_interval_ms: Some(1000.0 / self.spawn_rate),
            bubble_types: Some(self.bubble_types.clone()),
            type_chances: self.type_chances.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawner::SpawnPolicy;

    #[test]
    fn test_builtins_produce_valid_policies() {
        for id in BUILTIN_STAGES {
            let preset = StagePreset::from_name(id).unwrap();
            assert_eq!(preset.id, id);
            let config = preset.spawn_config().unwrap();
            let policy = SpawnPolicy::try_from(&config).unwrap();
            assert!(policy.max_bubbles >= 5);
        }
    }

    #[test]
    fn test_name_lookup_is_lenient() {
        assert_eq!(StagePreset::from_name("Golden-Rush").unwrap().id, "golden_rush");
        assert!(matches!(
            StagePreset::from_name("moon_base"),
            Err(ConfigError::UnknownStage(_))
        ));
    }

    #[test]
    fn test_rate_converts_to_interval() {
        let config = StagePreset::from_name("golden_rush").unwrap().spawn_config().unwrap();
        assert_eq!(config.spawn_interval_ms, Some(500.0));
        assert_eq!(config.max_bubbles, Some(25.0));
        assert_eq!(config.type_chances.len(), 1);
        assert_eq!(config.type_chances[0].kind, "golden");
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut preset = StagePreset::from_name("normal").unwrap();
        preset.spawn_rate = 20.0;
        assert!(matches!(
            preset.spawn_config(),
            Err(ConfigError::OutOfRange { field: "spawn_rate", .. })
        ));

        preset.spawn_rate = 1.0;
        preset.max_bubbles = 2.0;
        assert!(matches!(
            preset.validate(),
            Err(ConfigError::OutOfRange { field: "max_bubbles", .. })
        ));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{"id":"custom","bubble_types":["pink","magnetic"],"spawn_rate":4,"max_bubbles":12}"#;
        let preset = StagePreset::from_json(json).unwrap();
        assert_eq!(preset.bubble_types, vec!["pink", "magnetic"]);
        assert!(preset.type_chances.is_empty());
        assert_eq!(preset.chain_bonus, None);

        let bad = r#"{"id":"x","bubble_types":[],"spawn_rate":1,"max_bubbles":10}"#;
        assert!(matches!(StagePreset::from_json(bad), Err(ConfigError::EmptyRoster)));
    }
}
