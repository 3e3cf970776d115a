//! Tunable constants for difficulty resolution.
//!
//! Item-specific coefficients live in the [`items`](crate::items) registry;
//! this module holds the game-wide knobs that every item scales from. The
//! defaults are the shipped balance; a JSON override lets balance passes
//! run without a rebuild.
//!
//! ```
//! use keycracker_logic::config::CrackerConfig;
//!
//! let config = CrackerConfig::from_json(r#"{ "base_time_seconds": 25.0 }"#).unwrap();
//! assert_eq!(config.base_time_seconds, 25.0);
//! assert_eq!(config.min_time_seconds, CrackerConfig::default().min_time_seconds);
//! ```

use serde::{Deserialize, Serialize};

/// Hard floor on seconds per sequence. Overrides may raise it, never lower it.
pub const MIN_TIME_FLOOR_SECONDS: f32 = 5.0;

/// Game-wide balance configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrackerConfig {
    /// Seconds allowed per sequence before tool and lock modifiers.
    pub base_time_seconds: f32,
    /// Floor for allowed time, in seconds.
    pub min_time_seconds: f32,
    /// Symbols per sequence for locks without their own symbol rule.
    pub base_symbols: u32,
    /// Universal Key level at which every fortifier is neutralized.
    pub universal_key_threshold: u8,
    /// Tool damage on failure with no damage-on-fail fortifier attached.
    pub default_fail_damage: f32,
    /// Extra tool damage per Tripwire level.
    pub trap_damage_per_level: f32,
    /// Strength-reduction bonus per attacker level above the defender.
    pub level_gap_bonus_per_level: f32,
    /// Cap on the level-gap multiplier.
    pub level_gap_bonus_cap: f32,
    /// Upper bound on any per-round probability roll.
    pub reverse_chance_cap: f32,
    pub neutralize_chance_cap: f32,
    /// Flash blink duration: `flash_base_ms + flash_per_level_ms × level`.
    pub flash_base_ms: u32,
    pub flash_per_level_ms: u32,
}

impl Default for CrackerConfig {
    fn default() -> Self {
        Self {
            base_time_seconds: 20.0,
            min_time_seconds: 5.0,
            base_symbols: 6,
            universal_key_threshold: 3,
            default_fail_damage: 5.0,
            trap_damage_per_level: 10.0,
            level_gap_bonus_per_level: 0.05,
            level_gap_bonus_cap: 1.5,
            reverse_chance_cap: 0.4,
            neutralize_chance_cap: 0.5,
            flash_base_ms: 300,
            flash_per_level_ms: 100,
        }
    }
}

/// Failure to load a configuration override.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("`{field}` must be {requirement}, got {value}")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
        value: f32,
    },
}

impl CrackerConfig {
    /// Parse a JSON override. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CrackerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the resolver's floors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_time_seconds >= MIN_TIME_FLOOR_SECONDS) {
            return Err(ConfigError::OutOfRange {
                field: "min_time_seconds",
                requirement: "at least 5",
                value: self.min_time_seconds,
            });
        }
        if self.base_symbols == 0 {
            return Err(ConfigError::OutOfRange {
                field: "base_symbols",
                requirement: "at least 1",
                value: 0.0,
            });
        }
        for (field, value) in [
            ("reverse_chance_cap", self.reverse_chance_cap),
            ("neutralize_chance_cap", self.neutralize_chance_cap),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    requirement: "between 0 and 1",
                    value,
                });
            }
        }
        Ok(())
    }

    /// Effective per-sequence time floor in whole seconds, never below
    /// [`MIN_TIME_FLOOR_SECONDS`] even for an unvalidated config.
    pub fn time_floor_seconds(&self) -> u32 {
        let floor = if self.min_time_seconds.is_nan() {
            MIN_TIME_FLOOR_SECONDS
        } else {
            self.min_time_seconds.max(MIN_TIME_FLOOR_SECONDS)
        };
        floor.round() as u32
    }
}
