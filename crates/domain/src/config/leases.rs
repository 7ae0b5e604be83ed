use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeasesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_lease_path")]
    pub path: String,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for LeasesConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_lease_path(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_lease_path() -> String {
    "/var/lib/misc/dnsmasq.leases".to_string()
}

fn default_poll_interval_secs() -> u64 {
    2
}
