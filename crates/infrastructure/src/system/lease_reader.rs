use async_trait::async_trait;
use chrono::DateTime;
use fancy_regex::Regex;
use ferrous_dnsmasq_application::ports::LeaseReader;
use ferrous_dnsmasq_domain::{DomainError, Lease, MacAddress};
use std::io::ErrorKind;
use std::net::IpAddr;
use std::sync::LazyLock;
use std::time::SystemTime;
use tokio::fs;
use tracing::{debug, warn};

// <expiry> <mac> <ip> <hostname> <client-id>
static LEASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{10}|0) (\S+) (\S+) (\S+) \S+").expect("lease pattern is valid")
});

/// Parses the contents of a dnsmasq lease file.
///
/// Lines that do not look like a lease are ignored. Lease lines carrying an
/// unparsable MAC or IP address are skipped with a warning.
pub fn parse_leases(content: &str) -> Vec<Lease> {
    let mut leases = Vec::new();

    for line in content.lines() {
        let Ok(Some(caps)) = LEASE_RE.captures(line) else {
            continue;
        };
        let field = |i: usize| caps.get(i).map(|m| m.as_str()).unwrap_or_default();

        let expires = match field(1) {
            "0" => None,
            secs => match secs.parse::<i64>().ok().and_then(|s| DateTime::from_timestamp(s, 0)) {
                Some(at) => Some(at),
                None => {
                    warn!(expiry = secs, "Invalid expiry in lease file");
                    continue;
                }
            },
        };

        let mac_address = match field(2).parse::<MacAddress>() {
            Ok(mac) => mac,
            Err(e) => {
                warn!(error = %e, "Invalid MAC in lease file");
                continue;
            }
        };

        let ip_address = match field(3).parse::<IpAddr>() {
            Ok(ip) => ip,
            Err(e) => {
                warn!(error = %e, ip = field(3), "Invalid IP in lease file");
                continue;
            }
        };

        leases.push(Lease {
            expires,
            mac_address,
            ip_address,
            hostname: field(4).to_string(),
        });
    }

    leases
}

/// dnsmasq lease file reader (`dhcp-leasefile=`)
pub struct LeaseFileReader {
    path: String,
}

impl LeaseFileReader {
    pub fn with_path(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LeaseReader for LeaseFileReader {
    async fn read_leases(&self) -> Result<Vec<Lease>, DomainError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path, "Lease file does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(DomainError::LeaseReadError(format!(
                    "Failed to read {}: {}",
                    self.path, e
                )))
            }
        };

        let leases = parse_leases(&content);
        debug!(entries = leases.len(), "Lease file parsed");
        Ok(leases)
    }

    async fn last_modified(&self) -> Result<Option<SystemTime>, DomainError> {
        match fs::metadata(&self.path).await {
            Ok(meta) => meta.modified().map(Some).map_err(|e| {
                DomainError::LeaseReadError(format!("Failed to stat {}: {}", self.path, e))
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DomainError::LeaseReadError(format!(
                "Failed to stat {}: {}",
                self.path, e
            ))),
        }
    }
}
