use super::classifier::{classify_line, LogEvent};
use super::line_buffer::LineBuffer;
use super::line_source::open_log_pipe;
use super::tracker::QueryTracker;
use ferrous_dnsmasq_application::ports::{LineSource, LogObserver};
use ferrous_dnsmasq_domain::config::LogWatchConfig;
use ferrous_dnsmasq_domain::{DomainError, LogLine, Query};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Correlates dnsmasq log lines into completed [`Query`] values.
pub struct DnsmasqLogWatcher {
    pipe_path: PathBuf,
    query_timeout: Duration,
    buffer_capacity: usize,
    observer: Option<LogObserver>,
    errors: Option<mpsc::Sender<DomainError>>,
}

impl DnsmasqLogWatcher {
    pub fn new(config: &LogWatchConfig) -> Self {
        Self {
            pipe_path: PathBuf::from(&config.pipe_path),
            query_timeout: config.query_timeout(),
            buffer_capacity: config.buffer_capacity,
            observer: None,
            errors: None,
        }
    }

    pub fn with_observer(mut self, observer: LogObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Receives non-fatal per-line errors. Fatal errors are returned by
    /// [`watch`](Self::watch) instead.
    ///
    /// Errors are dropped while the channel is full.
    pub fn with_error_reporter(mut self, errors: mpsc::Sender<DomainError>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Watches the configured log pipe until `shutdown` is cancelled or the
    /// pipe fails.
    ///
    /// Every completed query is sent on `output`. The channel closes once this
    /// returns, after every pending query has been finalized.
    pub async fn watch(
        &self,
        shutdown: CancellationToken,
        output: mpsc::Sender<Query>,
    ) -> Result<(), DomainError> {
        let source = open_log_pipe(&self.pipe_path)?;
        info!(
            path = %self.pipe_path.display(),
            timeout_ms = self.query_timeout.as_millis() as u64,
            "Watching dnsmasq log pipe"
        );
        self.watch_source(source, shutdown, output).await
    }

    /// Same as [`watch`](Self::watch) over an arbitrary line source.
    ///
    /// When the source ends, queries still in flight get their full window.
    /// When it fails, they are finalized immediately and the error is
    /// returned.
    pub async fn watch_source<S>(
        &self,
        source: S,
        shutdown: CancellationToken,
        output: mpsc::Sender<Query>,
    ) -> Result<(), DomainError>
    where
        S: LineSource + 'static,
    {
        let token = shutdown.child_token();
        let buffer = Arc::new(LineBuffer::new(self.buffer_capacity));
        let tracker = QueryTracker::new(output, self.query_timeout, token.clone());

        let reader = tokio::spawn(read_lines(source, Arc::clone(&buffer), token.clone()));

        while let Some(line) = buffer.pop().await {
            self.ingest(&tracker, &line);
        }

        let result = match reader.await {
            Ok(result) => result,
            Err(e) => Err(DomainError::IoError(format!("Log reader task failed: {}", e))),
        };
        if result.is_err() {
            token.cancel();
        }

        tracker.drain().await;

        let stats = tracker.stats();
        info!(
            started = stats.started,
            emitted = stats.emitted,
            unanswered = stats.unanswered,
            late_updates = stats.late_updates,
            dropped_lines = buffer.dropped(),
            "dnsmasq log watch stopped"
        );
        result
    }

    fn ingest(&self, tracker: &Arc<QueryTracker>, line: &LogLine) {
        let event = classify_line(&line.text);

        if let Some(observer) = &self.observer {
            observer(&line.text, event.is_dns_related());
        }

        match event {
            LogEvent::QueryStart { id, client, domain } => match parse_client(client) {
                Ok(_) => tracker.start(id, client, domain, line.received_at),
                Err(e) => {
                    warn!(id, client, domain, "Ignoring query from invalid client address");
                    self.report(e);
                }
            },
            LogEvent::ForwardTo { id, server } => {
                if !tracker.record_forward(id, server) {
                    debug!(id, server, "Forward for untracked query");
                }
            }
            LogEvent::ReplyFrom { id, answer } => {
                if !tracker.record_answer(id, answer, line.received_at) {
                    debug!(id, answer, "Answer for untracked query");
                }
            }
            LogEvent::Unrecognized => {}
        }
    }

    fn report(&self, err: DomainError) {
        let Some(errors) = &self.errors else {
            return;
        };
        if let Err(mpsc::error::TrySendError::Full(err)) = errors.try_send(err) {
            debug!(error = %err, "Error reporter full, dropping error");
        }
    }
}

/// dnsmasq prints link-local IPv6 clients with a `%zone` suffix.
fn parse_client(client: &str) -> Result<IpAddr, DomainError> {
    let address = client.split_once('%').map_or(client, |(address, _)| address);
    address
        .parse()
        .map_err(|_| DomainError::InvalidIpAddress(client.to_string()))
}

struct CloseOnDrop<'a>(&'a LineBuffer);

impl Drop for CloseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}

async fn read_lines<S>(
    mut source: S,
    buffer: Arc<LineBuffer>,
    token: CancellationToken,
) -> Result<(), DomainError>
where
    S: LineSource,
{
    let _close = CloseOnDrop(&buffer);

    loop {
        let next = tokio::select! {
            _ = token.cancelled() => {
                debug!("Log reader cancelled");
                return Ok(());
            }
            next = source.next_line() => next,
        };

        match next {
            Ok(Some(line)) => {
                if buffer.push(line) {
                    debug!(
                        buffered = buffer.len(),
                        dropped = buffer.dropped(),
                        "Line buffer full, dropped oldest line"
                    );
                }
            }
            Ok(None) => {
                info!("dnsmasq log stream ended");
                return Ok(());
            }
            Err(e) => {
                error!(error = %e, "dnsmasq log stream failed");
                return Err(e);
            }
        }
    }
}
