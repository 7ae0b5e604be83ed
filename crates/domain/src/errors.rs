use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid MAC address: {0}")]
    InvalidMacAddress(String),

    #[error("Log source unavailable: {0}")]
    LogSourceUnavailable(String),

    #[error("Lease file read failed: {0}")]
    LeaseReadError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}
