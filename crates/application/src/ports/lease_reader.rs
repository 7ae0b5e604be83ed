use async_trait::async_trait;
use ferrous_dnsmasq_domain::{DomainError, Lease};
use std::time::SystemTime;

#[async_trait]
pub trait LeaseReader: Send + Sync {
    async fn read_leases(&self) -> Result<Vec<Lease>, DomainError>;

    /// Modification time of the underlying lease store, `None` when it
    /// does not exist yet.
    async fn last_modified(&self) -> Result<Option<SystemTime>, DomainError>;
}
