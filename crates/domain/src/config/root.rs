use serde::{Deserialize, Serialize};

use super::errors::ConfigError;
use super::leases::LeasesConfig;
use super::log_watch::LogWatchConfig;
use super::logging::LoggingConfig;
use super::output::{OutputConfig, OutputFormat};

const LOCAL_CONFIG_PATH: &str = "ferrous-dnsmasq.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/ferrous-dnsmasq/config.toml";

/// Main configuration structure for Ferrous dnsmasq
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// dnsmasq log pipe and query correlation
    #[serde(default)]
    pub log_watch: LogWatchConfig,

    /// DHCP lease file watching
    #[serde(default)]
    pub leases: LeasesConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Query output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-dnsmasq.toml in current directory
    /// 3. /etc/ferrous-dnsmasq/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Self::from_file(LOCAL_CONFIG_PATH)?
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Self::from_file(SYSTEM_CONFIG_PATH)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    /// Apply command-line overrides to configuration
    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(pipe) = overrides.pipe_path {
            self.log_watch.pipe_path = pipe;
        }
        if let Some(timeout) = overrides.query_timeout_ms {
            self.log_watch.query_timeout_ms = timeout;
        }
        if let Some(capacity) = overrides.buffer_capacity {
            self.log_watch.buffer_capacity = capacity;
        }
        if let Some(leases) = overrides.leases_path {
            self.leases.path = leases;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(format) = overrides.output_format {
            self.output.format = format;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_watch.pipe_path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "Log pipe path cannot be empty".to_string(),
            ));
        }

        if self.log_watch.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "Query timeout must be greater than 0".to_string(),
            ));
        }

        if self.log_watch.buffer_capacity == 0 {
            return Err(ConfigError::Validation(
                "Line buffer capacity must be greater than 0".to_string(),
            ));
        }

        if self.log_watch.event_capacity == 0 {
            return Err(ConfigError::Validation(
                "Event channel capacity must be greater than 0".to_string(),
            ));
        }

        if self.leases.enabled {
            if self.leases.path.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "Lease file path cannot be empty".to_string(),
                ));
            }
            if self.leases.poll_interval_secs == 0 {
                return Err(ConfigError::Validation(
                    "Lease poll interval must be greater than 0".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub pipe_path: Option<String>,
    pub query_timeout_ms: Option<u64>,
    pub buffer_capacity: Option<usize>,
    pub leases_path: Option<String>,
    pub log_level: Option<String>,
    pub output_format: Option<OutputFormat>,
}
