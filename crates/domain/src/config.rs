//! Configuration module for Ferrous dnsmasq
//!
//! This module contains all configuration structures organized by concern:
//! - `root`: Main configuration and CLI overrides
//! - `log_watch`: dnsmasq log pipe and query correlation settings
//! - `leases`: DHCP lease file watching
//! - `logging`: Logging settings
//! - `output`: How completed queries are printed
//! - `errors`: Configuration errors

pub mod errors;
pub mod leases;
pub mod log_watch;
pub mod logging;
pub mod output;
pub mod root;

pub use errors::ConfigError;
pub use leases::LeasesConfig;
pub use log_watch::LogWatchConfig;
pub use logging::LoggingConfig;
pub use output::{OutputConfig, OutputFormat};
pub use root::{CliOverrides, Config};
