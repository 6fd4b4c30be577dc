//! Configuration for engines and the host tick driver
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables (`SEQUENCE_ENGINE__DIAGNOSTICS=false`,
//! `SEQUENCE_DRIVER__TICK_INTERVAL_MS=33`, ...).
//!
//! # Example
//!
//! ```no_run
//! use sequence_core::config::ConfigLoader;
//!
//! let config = ConfigLoader::new().file("sequence.toml").load()?;
//! # Ok::<(), sequence_core::errors::ConfigError>(())
//! ```

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default config file searched for in the working directory (without extension)
pub const DEFAULT_CONFIG_NAME: &str = "sequence";

/// Default environment variable prefix
pub const DEFAULT_ENV_PREFIX: &str = "SEQUENCE";

/* ===================== Settings ===================== */

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub driver: DriverConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log the failing command's location before surfacing a command error
    pub diagnostics: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { diagnostics: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Delay between host ticks
    pub tick_interval_ms: u64,

    /// Give up driving after this many ticks (the engine keeps executing)
    pub max_ticks: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
            max_ticks: None,
        }
    }
}

impl DriverConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing-subscriber` filter used when `RUST_LOG` is not set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Config {
    /// Load from `sequence.toml` (if present) and `SEQUENCE_*` variables
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.driver.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "driver.tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.filter must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/* ===================== Loader ===================== */

/// Builder for loading a `Config`
pub struct ConfigLoader {
    path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            path: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Use this file instead of searching for `sequence.toml`; it must exist
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn load(self) -> Result<Config, ConfigError> {
        let file = match &self.path {
            Some(path) => config::File::from(path.as_path()).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let config: Config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use uuid::Uuid;

    fn write_temp(contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("sequence-config-{}.toml", Uuid::new_v4()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.engine.diagnostics);
        assert_eq!(config.driver.tick_interval(), Duration::from_millis(16));
        assert_eq!(config.driver.max_ticks, None);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_load_from_file() {
        let path = write_temp(
            r#"
            [engine]
            diagnostics = false

            [driver]
            tick_interval_ms = 5
            max_ticks = 100
            "#,
        );

        let config = ConfigLoader::new()
            .file(&path)
            .env_prefix("SEQUENCE_TEST_FILE")
            .load()
            .unwrap();
        fs::remove_file(&path).ok();

        assert!(!config.engine.diagnostics);
        assert_eq!(config.driver.tick_interval_ms, 5);
        assert_eq!(config.driver.max_ticks, Some(100));
        // untouched sections keep their defaults
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_env_overrides_file() {
        let path = write_temp("[driver]\ntick_interval_ms = 5\n");
        std::env::set_var("SEQUENCE_TEST_ENV_DRIVER__TICK_INTERVAL_MS", "40");

        let config = ConfigLoader::new()
            .file(&path)
            .env_prefix("SEQUENCE_TEST_ENV")
            .load()
            .unwrap();
        fs::remove_file(&path).ok();
        std::env::remove_var("SEQUENCE_TEST_ENV_DRIVER__TICK_INTERVAL_MS");

        assert_eq!(config.driver.tick_interval_ms, 40);
    }

    #[test]
    fn test_missing_required_file_fails() {
        let result = ConfigLoader::new()
            .file("/nonexistent/sequence-config.toml")
            .env_prefix("SEQUENCE_TEST_MISSING")
            .load();
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_zero_tick_interval_is_invalid() {
        let path = write_temp("[driver]\ntick_interval_ms = 0\n");
        let result = ConfigLoader::new()
            .file(&path)
            .env_prefix("SEQUENCE_TEST_INVALID")
            .load();
        fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_toml_output_reloads() {
        let mut config = Config::default();
        config.driver.tick_interval_ms = 25;
        let path = write_temp(&config.to_toml().unwrap());

        let reloaded = ConfigLoader::new()
            .file(&path)
            .env_prefix("SEQUENCE_TEST_TOML")
            .load()
            .unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(reloaded, config);
    }
}
