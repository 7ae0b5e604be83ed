#![allow(dead_code)]

use async_trait::async_trait;
use ferrous_dnsmasq_application::ports::LeaseReader;
use ferrous_dnsmasq_domain::{DomainError, Lease};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;

pub fn make_lease(ip: &str, mac: &str, hostname: &str) -> Lease {
    Lease {
        expires: None,
        mac_address: mac.parse().unwrap(),
        ip_address: ip.parse().unwrap(),
        hostname: hostname.to_string(),
    }
}

pub struct MockLeaseReader {
    leases: Arc<RwLock<Vec<Lease>>>,
    modified: Arc<RwLock<Option<SystemTime>>>,
    read_count: Arc<AtomicU64>,
    should_fail: Arc<RwLock<bool>>,
}

impl MockLeaseReader {
    pub fn new() -> Self {
        Self {
            leases: Arc::new(RwLock::new(Vec::new())),
            modified: Arc::new(RwLock::new(None)),
            read_count: Arc::new(AtomicU64::new(0)),
            should_fail: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn with_leases(leases: Vec<Lease>) -> Self {
        let reader = Self::new();
        reader.replace(leases).await;
        reader
    }

    /// Replaces the lease set and bumps the modification time.
    pub async fn replace(&self, leases: Vec<Lease>) {
        *self.leases.write().await = leases;
        let mut modified = self.modified.write().await;
        let next = match *modified {
            Some(previous) => previous + Duration::from_secs(1),
            None => SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
        };
        *modified = Some(next);
    }

    pub fn read_count(&self) -> u64 {
        self.read_count.load(Ordering::Relaxed)
    }

    pub async fn set_should_fail(&self, fail: bool) {
        *self.should_fail.write().await = fail;
    }
}

#[async_trait]
impl LeaseReader for MockLeaseReader {
    async fn read_leases(&self) -> Result<Vec<Lease>, DomainError> {
        self.read_count.fetch_add(1, Ordering::Relaxed);
        if *self.should_fail.read().await {
            return Err(DomainError::LeaseReadError("lease read failed".to_string()));
        }
        Ok(self.leases.read().await.clone())
    }

    async fn last_modified(&self) -> Result<Option<SystemTime>, DomainError> {
        Ok(*self.modified.read().await)
    }
}
