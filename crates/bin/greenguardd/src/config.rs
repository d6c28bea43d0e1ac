//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `greenguard.toml` in the working directory (or the path in
//! `GREENGUARD_CONFIG`). Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.
//! For the log filter `GREENGUARD_LOG` wins over `RUST_LOG`.

use std::time::Duration;

use serde::Deserialize;

use greenguard_domain::error::{GreenGuardError, error_chain};
use greenguard_domain::thresholds::ThresholdConfig;

const DEFAULT_PATH: &str = "greenguard.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Automatic controller settings.
    pub control: ControlConfig,
    /// Sensor history recording and retention.
    pub history: HistoryConfig,
    /// Simulated sensor feed.
    pub simulator: SimulatorConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Threshold controller configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Run the controller task. The stored mode still decides whether a
    /// pass writes anything.
    pub enabled: bool,
    pub thresholds: ThresholdConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Minimum seconds between two recorded points.
    pub record_interval_secs: u64,
    /// Points older than this are purged.
    pub retention_days: u32,
    /// Seconds between two purge runs.
    pub prune_interval_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Feed simulated readings into the store.
    pub enabled: bool,
    /// Seconds between two simulated readings.
    pub interval_secs: u64,
    /// Readings per simulated day.
    pub ticks_per_day: u64,
}

impl Config {
    /// Load configuration from the config file (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("GREENGUARD_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("GREENGUARD_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("GREENGUARD_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        if let Some(val) = var("GREENGUARD_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Some(val) = var("GREENGUARD_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("GREENGUARD_LOG").or_else(|| var("RUST_LOG")) {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.history.retention_days == 0 {
            return Err(ConfigError::Validation(
                "history.retention_days must be at least 1".to_string(),
            ));
        }
        if self.history.prune_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "history.prune_interval_secs must be non-zero".to_string(),
            ));
        }
        if self.simulator.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "simulator.interval_secs must be non-zero".to_string(),
            ));
        }
        self.control
            .thresholds
            .validate()
            .map_err(ConfigError::Thresholds)
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl HistoryConfig {
    #[must_use]
    pub fn record_interval(&self) -> Duration {
        Duration::from_secs(self.record_interval_secs)
    }

    #[must_use]
    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs)
    }
}

impl SimulatorConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:greenguard.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "greenguardd=info,greenguard=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            thresholds: ThresholdConfig::default(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            record_interval_secs: 60,
            retention_days: 30,
            prune_interval_secs: 6 * 3600,
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 5,
            ticks_per_day: 288,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
    /// Threshold table rejected.
    #[error("invalid control thresholds: {}", error_chain(.0))]
    Thresholds(GreenGuardError),
}
