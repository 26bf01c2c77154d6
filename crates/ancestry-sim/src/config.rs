//! Simulation configuration, loadable from YAML.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SimulationError;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("reading config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The file could not be parsed as YAML.
    #[error("parsing config file: {source}")]
    Yaml {
        /// The underlying YAML error.
        #[from]
        source: serde_yml::Error,
    },
}

/// Tunable parameters for one simulation run.
///
/// Every field has a default, so a partial (or empty) YAML document is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of diploid individuals; constant across generations.
    pub population_size: usize,
    /// Per-generation probability that an individual survives unchanged.
    /// Must lie in `[0, 1)`.
    pub survival_probability: f64,
    /// Generations to run before the measured portion of the simulation.
    pub burnin: u64,
    /// Generations in the measured portion of the simulation.
    pub generations: u64,
    /// Simplify the tables every this many generations. Must be positive.
    pub simplification_period: u64,
    /// Seed for the deterministic random stream.
    pub seed: u64,
    /// Re-run the scenario with direct edge-table recording and assert both
    /// pipelines produce identical tables.
    pub verify_against_classic: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            survival_probability: 0.9,
            burnin: 0,
            generations: 1000,
            simplification_period: 10,
            seed: 42,
            verify_against_classic: false,
        }
    }
}

impl SimulationConfig {
    /// Loads a configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Checks that every parameter is inside its legal range.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.population_size == 0 {
            return Err(SimulationError::InvalidParameter {
                reason: "population_size must be positive".to_owned(),
            });
        }
        if !self.survival_probability.is_finite()
            || self.survival_probability < 0.0
            || self.survival_probability >= 1.0
        {
            return Err(SimulationError::InvalidParameter {
                reason: format!(
                    "survival_probability must lie in [0, 1), got {}",
                    self.survival_probability
                ),
            });
        }
        if self.simplification_period == 0 {
            return Err(SimulationError::InvalidParameter {
                reason: "simplification_period must be positive".to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SimulationConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config: SimulationConfig =
            serde_yml::from_str("population_size: 7\nseed: 5\n").unwrap();
        assert_eq!(config.population_size, 7);
        assert_eq!(config.seed, 5);
        assert_eq!(config.generations, 1000);
        assert!((config.survival_probability - 0.9).abs() < 1e-12);
    }

    #[test]
    fn rejects_survival_probability_of_one() {
        let config = SimulationConfig {
            survival_probability: 1.0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn rejects_negative_survival_probability() {
        let config = SimulationConfig {
            survival_probability: -0.1,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimulationError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn accepts_zero_survival_probability() {
        let config = SimulationConfig {
            survival_probability: 0.0,
            ..SimulationConfig::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn rejects_zero_population() {
        let config = SimulationConfig {
            population_size: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_period() {
        let config = SimulationConfig {
            simplification_period: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
