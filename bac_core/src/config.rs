//! Configuration file support for bactrack.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/bactrack/config.toml`.

use crate::{scheduler::SchedulerOptions, Error, Metabolism, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub metabolism: MetabolismConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Default metabolism preset for new sessions
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct MetabolismConfig {
    #[serde(default)]
    pub slow: bool,
}

impl MetabolismConfig {
    pub fn preset(&self) -> Metabolism {
        Metabolism::from_slow_flag(self.slow)
    }
}

/// Live recompute loop timing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_cadence_ms")]
    pub cadence_ms: u64,

    /// Smallest BAC change worth publishing
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cadence_ms: default_cadence_ms(),
            epsilon: default_epsilon(),
        }
    }
}

impl From<&SchedulerConfig> for SchedulerOptions {
    fn from(config: &SchedulerConfig) -> Self {
        SchedulerOptions {
            cadence: Duration::from_millis(config.cadence_ms),
            epsilon: config.epsilon,
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(std::env::temp_dir);
    base.join("bactrack")
}

fn default_cadence_ms() -> u64 {
    1000
}

fn default_epsilon() -> f64 {
    0.001
}

impl Config {
    /// Load configuration from the standard config path, or defaults if absent
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => Self::parse(&contents, &config_path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {:?}, using defaults", config_path);
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::parse(&std::fs::read_to_string(path)?, path)
    }

    fn parse(contents: &str, origin: &Path) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        tracing::debug!("Loaded config from {:?}", origin);
        Ok(config)
    }

    /// Reject settings the recompute loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.cadence_ms == 0 {
            return Err(Error::Config("scheduler.cadence_ms must be positive".into()));
        }
        if !self.scheduler.epsilon.is_finite() || self.scheduler.epsilon < 0.0 {
            return Err(Error::Config(format!(
                "scheduler.epsilon must be a non-negative number (got {})",
                self.scheduler.epsilon
            )));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(std::env::temp_dir);
        base.join("bactrack").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        crate::state::write_atomic(path, &contents)?;
        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }
}
