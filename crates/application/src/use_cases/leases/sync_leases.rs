use crate::ports::LeaseReader;
use ferrous_dnsmasq_domain::{DomainError, Lease};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Use case: Re-read the DHCP lease file whenever dnsmasq rewrites it
/// Should be run periodically (e.g., every 2 seconds)
pub struct SyncLeasesUseCase {
    lease_reader: Arc<dyn LeaseReader>,
    last_seen: Mutex<Option<SystemTime>>,
}

impl SyncLeasesUseCase {
    pub fn new(lease_reader: Arc<dyn LeaseReader>) -> Self {
        Self {
            lease_reader,
            last_seen: Mutex::new(None),
        }
    }

    /// Returns the full lease snapshot when the file changed since the
    /// previous call, `None` otherwise.
    pub async fn execute(&self) -> Result<Option<Vec<Lease>>, DomainError> {
        let mut last_seen = self.last_seen.lock().await;

        let Some(modified) = self.lease_reader.last_modified().await? else {
            debug!("Lease file not present yet");
            return Ok(None);
        };

        if *last_seen == Some(modified) {
            return Ok(None);
        }

        let leases = self.lease_reader.read_leases().await?;
        *last_seen = Some(modified);

        info!(leases = leases.len(), "Lease file reloaded");
        Ok(Some(leases))
    }
}
