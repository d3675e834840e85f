//! Scoring configuration.
//!
//! Defaults reproduce the reference weights. A YAML file can override any
//! subset of fields, and a few environment variables are read by the
//! runner binaries (see [`env`]).

use crate::align::DEFAULT_MIN_SIMILARITY;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Relative weight of each score component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub coverage: f64,
    pub order: f64,
    pub length: f64,
    pub redundancy: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            coverage: 0.6,
            order: 0.15,
            length: 0.1,
            redundancy: 0.15,
        }
    }
}

/// Everything the scorer needs besides the two paths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub weights: ScoreWeights,
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,
}

fn default_min_similarity() -> f64 {
    DEFAULT_MIN_SIMILARITY
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }
}

impl ScoringConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: ScoringConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Defaults with the environment override for the match threshold applied.
    pub fn from_env() -> Self {
        Self {
            min_similarity: env::min_similarity(),
            ..Self::default()
        }
    }

    pub fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_similarity) {
            return Err(ConfigError::invalid(format!(
                "min_similarity must be within [0, 1], got {}",
                self.min_similarity
            )));
        }
        let w = &self.weights;
        for (name, value) in [
            ("coverage", w.coverage),
            ("order", w.order),
            ("length", w.length),
            ("redundancy", w.redundancy),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(format!(
                    "weight '{name}' must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Environment variable configuration
pub mod env {
    use super::DEFAULT_MIN_SIMILARITY;
    use std::env;
    use std::path::PathBuf;
    use std::str::FromStr;

    pub const MIN_SIMILARITY_VAR: &str = "TRAJEVAL_MIN_SIMILARITY";
    pub const GOLDEN_PATHS_VAR: &str = "TRAJEVAL_GOLDEN_PATHS";
    pub const SCORING_CONFIG_VAR: &str = "TRAJEVAL_SCORING_CONFIG";

    /// Match threshold for the aligner; invalid or out-of-range values fall back to the default
    pub fn min_similarity() -> f64 {
        env::var(MIN_SIMILARITY_VAR)
            .ok()
            .and_then(|s| f64::from_str(s.trim()).ok())
            .filter(|v| (0.0..=1.0).contains(v))
            .unwrap_or(DEFAULT_MIN_SIMILARITY)
    }

    /// YAML file replacing the built-in golden path table
    pub fn golden_paths_path() -> Option<PathBuf> {
        non_empty_var(GOLDEN_PATHS_VAR).map(PathBuf::from)
    }

    /// YAML scoring configuration file
    pub fn scoring_config_path() -> Option<PathBuf> {
        non_empty_var(SCORING_CONFIG_VAR).map(PathBuf::from)
    }

    fn non_empty_var(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScoringConfig::default();
        assert_eq!(config.min_similarity, 0.45);
        assert_eq!(config.weights.coverage, 0.6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ScoringConfig::from_yaml_str("weights:\n  coverage: 0.7\n").unwrap();
        assert_eq!(config.weights.coverage, 0.7);
        assert_eq!(config.weights.order, 0.15);
        assert_eq!(config.min_similarity, 0.45);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(ScoringConfig::from_yaml_str("min_similarity: 1.5\n").is_err());
        assert!(ScoringConfig::from_yaml_str("weights:\n  length: -0.1\n").is_err());
        assert!(ScoringConfig::from_yaml_str("weights: [1, 2]\n").is_err());
    }
}
