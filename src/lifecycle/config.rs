//! Simulation settings.
//!
//! Every field has a default, so a JSON file only needs the values it changes:
//!
//! ```json
//! { "approach_interval_ms": 1000, "average_speed_kmh": 30.0 }
//! ```

use crate::model::{Coordinate, EstimatorSettings};
use crate::simulation::MovementStrategy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Environment variable naming a JSON settings file.
pub const CONFIG_ENV: &str = "DELIVERY_TRACKER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Tick of the approach tracker.
    pub approach_interval_ms: u64,
    /// Share of the remaining distance covered per approach tick.
    pub approach_fraction: f64,
    /// Tick of the random-walk tracker.
    pub random_walk_interval_ms: u64,
    /// Full width, in degrees, of the random-walk jitter.
    pub random_walk_delta: f64,
    pub average_speed_kmh: f64,
    pub route_steps: usize,
    pub history_limit: usize,
    pub arriving_km: f64,
    pub very_close_km: f64,
    /// Order actor mailbox capacity.
    pub channel_buffer: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            approach_interval_ms: 5_000,
            approach_fraction: 0.0001,
            random_walk_interval_ms: 10_000,
            random_walk_delta: 0.001,
            average_speed_kmh: 25.0,
            route_steps: 10,
            history_limit: 50,
            arriving_km: 0.1,
            very_close_km: 0.5,
            channel_buffer: 32,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Reads the file named by `DELIVERY_TRACKER_CONFIG`, or falls back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                info!(path = %path.display(), "Loading settings");
                Self::from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if self.approach_interval_ms == 0 {
            return Err(invalid("approach_interval_ms", "must be positive"));
        }
        if self.random_walk_interval_ms == 0 {
            return Err(invalid("random_walk_interval_ms", "must be positive"));
        }
        if !(self.approach_fraction > 0.0 && self.approach_fraction <= 1.0) {
            return Err(invalid("approach_fraction", format!("{} is outside (0, 1]", self.approach_fraction)));
        }
        if !(self.random_walk_delta.is_finite() && self.random_walk_delta >= 0.0) {
            return Err(invalid("random_walk_delta", "must be a non-negative number"));
        }
        if !(self.average_speed_kmh.is_finite() && self.average_speed_kmh > 0.0) {
            return Err(invalid("average_speed_kmh", "must be positive"));
        }
        if self.route_steps == 0 {
            return Err(invalid("route_steps", "must be at least 1"));
        }
        if self.history_limit == 0 {
            return Err(invalid("history_limit", "must be at least 1"));
        }
        if self.channel_buffer == 0 {
            return Err(invalid("channel_buffer", "must be at least 1"));
        }
        if !(self.arriving_km > 0.0 && self.arriving_km < self.very_close_km) {
            return Err(invalid(
                "arriving_km",
                format!("{} must be positive and below very_close_km ({})", self.arriving_km, self.very_close_km),
            ));
        }
        Ok(())
    }

    /// The order actor's context.
    pub fn estimator_settings(&self) -> EstimatorSettings {
        EstimatorSettings {
            average_speed_kmh: self.average_speed_kmh,
            route_steps: self.route_steps,
            arriving_km: self.arriving_km,
            very_close_km: self.very_close_km,
            history_limit: self.history_limit,
        }
    }

    pub fn approach_interval(&self) -> Duration {
        Duration::from_millis(self.approach_interval_ms)
    }

    pub fn random_walk_interval(&self) -> Duration {
        Duration::from_millis(self.random_walk_interval_ms)
    }

    pub fn approach_strategy(&self, target: Coordinate) -> MovementStrategy {
        MovementStrategy::Approach {
            target,
            fraction: self.approach_fraction,
        }
    }

    pub fn random_walk_strategy(&self) -> MovementStrategy {
        MovementStrategy::RandomWalk {
            max_delta: self.random_walk_delta,
        }
    }
}
