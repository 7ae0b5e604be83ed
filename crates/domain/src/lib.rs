//! Ferrous dnsmasq Domain Layer
pub mod config;
pub mod errors;
pub mod lease;
pub mod log_line;
pub mod query;

pub use config::{CliOverrides, Config, ConfigError};
pub use errors::DomainError;
pub use lease::{Lease, MacAddress};
pub use log_line::LogLine;
pub use query::Query;
