//! Configuration management for SignalMesh.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
#[cfg(feature = "toml")]
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

/// Tunables of the signal network engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Mirror "any signal active" onto every member's display flag after a pass
    pub show_state: bool,
    /// Deepest chain of cross-network notifications a propagation run follows
    pub max_propagation_depth: u32,
    /// Hard cap on notifications delivered in one propagation run
    pub max_notifications_per_run: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            show_state: true,
            max_propagation_depth: 64,
            max_notifications_per_run: 65_536,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    #[cfg(feature = "toml")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        Ok(config)
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            engine: EngineConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.engine.max_propagation_depth == 0 {
            return Err(CoreError::Invalid(
                "engine.max_propagation_depth must be at least 1".to_string(),
            ));
        }
        if self.engine.max_notifications_per_run == 0 {
            return Err(CoreError::Invalid(
                "engine.max_notifications_per_run must be at least 1".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(CoreError::Invalid("logging.level must not be empty".to_string()));
        }
        Ok(())
    }
}
