//! Configuration loading and typed config structures for the ticketing engine.
//!
//! The engine reads `ticketing-config.yaml` from the working directory when
//! it exists. Every field has a default, so an empty or missing file yields a
//! working engine on port 8081 (the port the dashboard targets).
//!
//! Per-run parameters (total tickets, rates, capacity) are *not* configured
//! here; they arrive with each start request. This file holds what stays
//! fixed for the lifetime of the process: the listener address, worker
//! counts, batch size, and the stop timeout.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Worker pool shape shared by every run.
    #[serde(default)]
    pub simulation: SimulationSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the listener:
    /// - `TICKETING_HOST` overrides `server.host`
    /// - `TICKETING_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.server.apply_env_overrides()?;
        config.simulation.validate()?;
        Ok(config)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Address to bind (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origin allowed by CORS. `None` allows any origin.
    #[serde(default)]
    pub allowed_origin: Option<String>,
}

impl ServerSettings {
    /// Override listener settings with environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `TICKETING_PORT` is not a port number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("TICKETING_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("TICKETING_PORT") {
            self.port = val.trim().parse().map_err(|_err| ConfigError::Invalid {
                reason: format!("TICKETING_PORT must be a port number, got {val:?}"),
            })?;
        }
        Ok(())
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origin: None,
        }
    }
}

/// Worker pool shape applied to every run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationSettings {
    /// Number of vendor workers per run.
    #[serde(default = "default_worker_count")]
    pub vendors: u32,

    /// Number of customer workers per run.
    #[serde(default = "default_worker_count")]
    pub customers: u32,

    /// Tickets moved per pool operation.
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// How long `stop` waits for workers before aborting them.
    #[serde(default = "default_stop_timeout_ms")]
    pub stop_timeout_ms: u64,
}

impl SimulationSettings {
    /// Reject worker counts or batch sizes of zero.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("simulation.vendors", self.vendors),
            ("simulation.customers", self.customers),
            ("simulation.batch_size", self.batch_size),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    reason: format!("{name} must be at least 1"),
                });
            }
        }
        Ok(())
    }

    /// The stop timeout as a [`Duration`].
    pub const fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            vendors: default_worker_count(),
            customers: default_worker_count(),
            batch_size: default_batch_size(),
            stop_timeout_ms: default_stop_timeout_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8081
}

const fn default_worker_count() -> u32 {
    1
}

const fn default_batch_size() -> u32 {
    1
}

const fn default_stop_timeout_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    "info".to_owned()
}
