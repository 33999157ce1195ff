//! Training configuration loaded from YAML.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::abstraction::AbstractionLevel;

/// Parameters for one training run.
#[derive(Debug, Clone, Deserialize)]
pub struct TrainingConfig {
    /// Human-readable name; also the default strategy file stem.
    pub name: String,
    /// Number of CFR iterations to run.
    pub iterations: u64,
    /// Outcome-sampling Monte Carlo instead of full-tree traversal.
    #[serde(default = "default_monte_carlo")]
    pub monte_carlo: bool,
    /// RNG seed; omit for an entropy seed.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Hand abstraction level.
    #[serde(default)]
    pub hand_abstraction: AbstractionLevel,
    /// Bet abstraction level.
    #[serde(default)]
    pub bet_abstraction: AbstractionLevel,
    /// Monte-Carlo rollouts per uncached postflop equity evaluation.
    #[serde(default = "default_equity_samples")]
    pub equity_samples: u32,
    /// Prune the regret table every this many iterations (0 disables).
    #[serde(default = "default_prune_interval")]
    pub prune_interval: u64,
    /// Regret magnitude at or below which a key may be pruned.
    #[serde(default = "default_prune_threshold")]
    pub prune_threshold: f64,
    /// Invoke the progress callback every this many iterations.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
    /// Directory that strategy files are written into.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

fn default_monte_carlo() -> bool {
    true
}

fn default_equity_samples() -> u32 {
    10_000
}

fn default_prune_interval() -> u64 {
    20
}

fn default_prune_threshold() -> f64 {
    0.01
}

fn default_progress_interval() -> u64 {
    10
}

fn default_output_dir() -> String {
    "strategies".to_string()
}

impl TrainingConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a
    /// value fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or fails validation.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if self.equity_samples == 0 {
            return Err(ConfigError::ZeroEquitySamples);
        }
        if self.prune_threshold < 0.0 {
            return Err(ConfigError::NegativePruneThreshold(self.prune_threshold));
        }
        if self.progress_interval == 0 {
            return Err(ConfigError::ZeroProgressInterval);
        }
        Ok(())
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            iterations: 1_000,
            monte_carlo: true,
            seed: None,
            hand_abstraction: AbstractionLevel::Standard,
            bet_abstraction: AbstractionLevel::Standard,
            equity_samples: default_equity_samples(),
            prune_interval: default_prune_interval(),
            prune_threshold: default_prune_threshold(),
            progress_interval: default_progress_interval(),
            output_dir: default_output_dir(),
        }
    }
}

/// Errors from loading or validating a training configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file.
    #[error("failed to read config file {0}: {1}")]
    Io(std::path::PathBuf, #[source] std::io::Error),

    /// YAML parsing error.
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("name cannot be empty")]
    EmptyName,

    #[error("iterations must be > 0")]
    ZeroIterations,

    #[error("equity_samples must be > 0")]
    ZeroEquitySamples,

    #[error("prune_threshold must be >= 0, got {0}")]
    NegativePruneThreshold(f64),

    #[error("progress_interval must be > 0")]
    ZeroProgressInterval,
}
