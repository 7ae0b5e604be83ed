use ferrous_dnsmasq_application::use_cases::SyncLeasesUseCase;
use ferrous_dnsmasq_domain::Lease;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Publishes a fresh lease snapshot every time dnsmasq rewrites its lease
/// file. Empty snapshots are not published.
pub struct LeaseWatchJob {
    sync_leases: Arc<SyncLeasesUseCase>,
    output: mpsc::Sender<Vec<Lease>>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl LeaseWatchJob {
    pub fn new(sync_leases: Arc<SyncLeasesUseCase>, output: mpsc::Sender<Vec<Lease>>) -> Self {
        Self {
            sync_leases,
            output,
            interval: DEFAULT_POLL_INTERVAL,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Runs until cancelled or until the snapshot receiver is dropped.
    pub async fn start(self: Arc<Self>) {
        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Starting lease watch job"
        );

        let mut interval = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("LeaseWatchJob: shutting down");
                    break;
                }
                _ = interval.tick() => {
                    let leases = match self.sync_leases.execute().await {
                        Ok(Some(leases)) if !leases.is_empty() => leases,
                        Ok(Some(_)) => {
                            debug!("Lease file changed but holds no leases");
                            continue;
                        }
                        Ok(None) => continue,
                        Err(e) => {
                            error!(error = %e, "Lease sync failed");
                            continue;
                        }
                    };

                    tokio::select! {
                        _ = self.shutdown.cancelled() => {
                            info!("LeaseWatchJob: shutting down");
                            break;
                        }
                        sent = self.output.send(leases) => {
                            if sent.is_err() {
                                info!("LeaseWatchJob: snapshot receiver closed");
                                break;
                            }
                        }
                    }
                }
            }
        }
    }
}
