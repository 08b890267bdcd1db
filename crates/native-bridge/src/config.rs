//! Configuration for the bridge and its reference engine
//!
//! Loaded from TOML, with every field optional:
//!
//! ```toml
//! [logging]
//! level = "debug"
//! json = false
//!
//! [engine]
//! max_objects = 4096
//! ```
//!
//! `RVOIP_BRIDGE_LOG_LEVEL` and `RVOIP_BRIDGE_MAX_OBJECTS` override the file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::logging::{parse_log_level, LoggingConfig};

pub const ENV_LOG_LEVEL: &str = "RVOIP_BRIDGE_LOG_LEVEL";
pub const ENV_MAX_OBJECTS: &str = "RVOIP_BRIDGE_MAX_OBJECTS";

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub logging: LoggingSettings,
    pub engine: EngineSettings,
}

/// Logging configuration as written in the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
    pub file_info: bool,
    pub log_spans: bool,
    pub app_name: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_info: false,
            log_spans: false,
            app_name: "rvoip-native-bridge".to_string(),
        }
    }
}

/// In-memory engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Maximum number of live native objects, unlimited when absent
    pub max_objects: Option<usize>,
}

impl BridgeConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: BridgeConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Apply overrides from the process environment
    pub fn apply_env_overrides(mut self) -> Result<Self> {
        if let Ok(level) = std::env::var(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
        if let Ok(max) = std::env::var(ENV_MAX_OBJECTS) {
            let max = max.trim().parse::<usize>().map_err(|_| {
                BridgeError::Config(format!(
                    "{} must be an integer, got {:?}",
                    ENV_MAX_OBJECTS, max
                ))
            })?;
            self.engine.max_objects = Some(max);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        parse_log_level(&self.logging.level)?;
        if self.engine.max_objects == Some(0) {
            return Err(BridgeError::Config("engine.max_objects must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Logging configuration ready for [`crate::logging::setup_logging`]
    pub fn logging_config(&self) -> Result<LoggingConfig> {
        let level = parse_log_level(&self.logging.level)?;
        let mut config = LoggingConfig::new(level, self.logging.app_name.clone());
        if self.logging.json {
            config = config.with_json();
        }
        if self.logging.file_info {
            config = config.with_file_info();
        }
        if self.logging.log_spans {
            config = config.with_spans();
        }
        Ok(config)
    }
}
