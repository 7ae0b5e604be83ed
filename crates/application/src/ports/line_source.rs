use async_trait::async_trait;
use ferrous_dnsmasq_domain::{DomainError, LogLine};

/// Live, append-only stream of log lines.
///
/// Implementations block until a line is available and yield only trimmed,
/// non-empty lines. `Ok(None)` means the stream has ended; an `Err` is fatal
/// to whoever is watching the stream.
#[async_trait]
pub trait LineSource: Send {
    async fn next_line(&mut self) -> Result<Option<LogLine>, DomainError>;
}
