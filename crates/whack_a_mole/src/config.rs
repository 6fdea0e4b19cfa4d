use core::time::Duration;

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
const CONFIG_PATH: &str = "assets/config/game.ron";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse game config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Spawn interval floor must be positive")]
    ZeroSpawnFloor,

    #[error("Spawn interval floor {floor} ms is above the base interval {base} ms")]
    FloorAboveBase { floor: u32, base: u32 },

    #[error("Active duration range {min}..={max} ms is empty")]
    EmptyActiveRange { min: u32, max: u32 },

    #[error("Score speedup divisor must be positive")]
    ZeroSpeedupDivisor,

    #[error("At least one target slot is required")]
    NoSlots,

    #[error("Miss distance must be positive, got {0}")]
    InvalidMissDistance(f32),
}

/// What a click that hits nothing at all is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum MissPolicy {
    #[default]
    NoScore,
    /// Flat bonus for a clean miss.
    StylePoints(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    pub true_hit: u32,
    pub background_hit: u32,
    /// Consolation points for clicking a target that is no longer up. `None` disables the
    /// rule and such clicks change nothing.
    pub late_hit: Option<u32>,
    pub miss: MissPolicy,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            true_hit: 100,
            background_hit: 1,
            late_hit: None,
            miss: MissPolicy::NoScore,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Length of a round
    pub round_seconds: u32,

    /// Spawner cadence at the start of a round
    pub spawn_interval_base_ms: u32,
    /// Cadence reduction per true hit
    pub spawn_interval_step_ms: u32,
    /// Cadence never drops below this
    pub spawn_interval_floor_ms: u32,
    /// Every `score_speedup_divisor` points shave one more millisecond off the cadence
    pub score_speedup_divisor: u32,

    /// Bounds of the random time a raised target stays up, before difficulty
    pub active_duration_min_ms: u32,
    pub active_duration_max_ms: u32,
    /// Difficulty never shortens the active time below this
    pub active_duration_floor_ms: u32,

    /// Delay between a hit and the retraction of the target
    pub hit_reaction_ms: u32,

    /// Distance along the ray where a miss is reported
    pub miss_distance: f32,

    pub scoring: ScoringRules,

    /// Fully raised position of every slot
    pub slots: Vec<[f32; 3]>,
    /// Vertical offset of a hidden target
    pub hidden_offset: f32,
    /// Vertical offset of a target sinking after a hit
    pub sink_offset: f32,
    /// Speed at which the visible model follows the logical offset, in units per second
    pub raise_speed: f32,
    pub model_scale: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_seconds: 30,
            spawn_interval_base_ms: 800,
            spawn_interval_step_ms: 5,
            spawn_interval_floor_ms: 200,
            score_speedup_divisor: 20,
            active_duration_min_ms: 200,
            active_duration_max_ms: 3000,
            active_duration_floor_ms: 100,
            hit_reaction_ms: 400,
            miss_distance: 200.0,
            scoring: ScoringRules::default(),
            // Two rows, left to right: [1, 2, 3, 4] [5, 6, 7, 8, 9]
            slots: vec![
                [28.0, 0.0, 1.5],
                [13.0, 0.0, -9.0],
                [-1.0, 0.0, -6.0],
                [-23.0, 0.0, 3.0],
                [23.0, 0.0, -18.0],
                [9.5, 0.0, -27.5],
                [-2.75, 0.0, -19.25],
                [-19.0, 0.0, -23.0],
                [-35.0, 0.0, -14.0],
            ],
            hidden_offset: -16.0,
            sink_offset: -6.0,
            raise_speed: 80.0,
            model_scale: 0.1,
        }
    }
}

impl GameConfig {
    pub fn from_ron(data: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let data = match std::fs::read_to_string(CONFIG_PATH) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: CONFIG_PATH.to_string(),
                    source,
                });
            }
        };
        Self::from_ron(&data).map(Some)
    }

    // No filesystem in the browser, the file is embedded at compile time
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::from_ron(include_str!("../assets/config/game.ron")).map(Some)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(err) => {
                warn!("{err}, falling back to default game config");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spawn_interval_floor_ms == 0 {
            return Err(ConfigError::ZeroSpawnFloor);
        }
        if self.spawn_interval_floor_ms > self.spawn_interval_base_ms {
            return Err(ConfigError::FloorAboveBase {
                floor: self.spawn_interval_floor_ms,
                base: self.spawn_interval_base_ms,
            });
        }
        if self.active_duration_min_ms > self.active_duration_max_ms {
            return Err(ConfigError::EmptyActiveRange {
                min: self.active_duration_min_ms,
                max: self.active_duration_max_ms,
            });
        }
        if self.score_speedup_divisor == 0 {
            return Err(ConfigError::ZeroSpeedupDivisor);
        }
        if self.slots.is_empty() {
            return Err(ConfigError::NoSlots);
        }
        if !(self.miss_distance > 0.0) {
            return Err(ConfigError::InvalidMissDistance(self.miss_distance));
        }
        Ok(())
    }

    pub fn slot_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.slots.iter().map(|&position| Vec3::from_array(position))
    }

    pub const fn hit_reaction(&self) -> Duration {
        Duration::from_millis(self.hit_reaction_ms as u64)
    }

    /// Logical vertical offset for a target state: raised while enabled, partly sunk
    /// after a hit, hidden otherwise.
    pub fn offset_for(&self, enabled: bool, hit: bool) -> f32 {
        if hit {
            self.sink_offset
        } else if enabled {
            0.0
        } else {
            self.hidden_offset
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok(), "defaults must validate");
    }

    #[test]
    fn bundled_config_parses() {
        let config = GameConfig::from_ron(include_str!("../assets/config/game.ron"));
        assert!(config.is_ok(), "bundled config failed: {config:?}");
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config = GameConfig::from_ron("(round_seconds: 45, scoring: (miss: StylePoints(10)))");
        let Ok(config) = config else {
            panic!("partial config rejected: {config:?}");
        };
        assert_eq!(config.round_seconds, 45, "overridden field");
        assert_eq!(config.scoring.miss, MissPolicy::StylePoints(10), "nested override");
        assert_eq!(config.scoring.true_hit, 100, "nested default kept");
        assert_eq!(config.slots.len(), 9, "slot default kept");
    }

    #[test]
    fn floor_above_base_is_rejected() {
        let config = GameConfig {
            spawn_interval_base_ms: 100,
            spawn_interval_floor_ms: 150,
            ..GameConfig::default()
        };
        assert!(
            matches!(
                config.validate(),
                Err(ConfigError::FloorAboveBase {
                    floor: 150,
                    base: 100
                })
            ),
            "floor above base must be rejected"
        );
    }

    #[test]
    fn zero_floor_is_rejected() {
        let config = GameConfig {
            spawn_interval_floor_ms: 0,
            ..GameConfig::default()
        };
        assert!(
            matches!(config.validate(), Err(ConfigError::ZeroSpawnFloor)),
            "a zero floor would let the cadence reach zero"
        );
    }

    #[test]
    fn offset_is_a_function_of_state() {
        let config = GameConfig::default();
        assert_eq!(config.offset_for(true, false), 0.0, "raised");
        assert_eq!(config.offset_for(false, true), -6.0, "sinking");
        assert_eq!(config.offset_for(false, false), -16.0, "hidden");
    }
}
