use chrono::{DateTime, Utc};

/// A single raw line read from the dnsmasq log stream.
///
/// Lines are stamped on arrival because dnsmasq's syslog prefix carries
/// neither a year nor sub-second precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl LogLine {
    pub fn new(text: impl Into<String>) -> Self {
        Self::received_at(text, Utc::now())
    }

    pub fn received_at(text: impl Into<String>, received_at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            received_at,
        }
    }
}
