use chrono::{DateTime, Utc};
use serde::Serialize;

/// DNS query served by dnsmasq, reconstructed from its log lines.
///
/// `queried` is empty when the answer came from dnsmasq's cache, and
/// `result` may hold several answers (one per `reply`/`cached` line).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Query {
    pub domain: String,
    pub made_by: String,
    pub queried: Vec<String>,
    pub result: Vec<String>,
    pub started: DateTime<Utc>,
    /// Time of the last recorded answer, `None` until one arrives.
    pub finished: Option<DateTime<Utc>>,
}

impl Query {
    pub fn new(
        domain: impl Into<String>,
        made_by: impl Into<String>,
        started: DateTime<Utc>,
    ) -> Self {
        Self {
            domain: domain.into(),
            made_by: made_by.into(),
            queried: Vec::with_capacity(1),
            result: Vec::with_capacity(1),
            started,
            finished: None,
        }
    }

    pub fn record_forward(&mut self, server: impl Into<String>) {
        self.queried.push(server.into());
    }

    pub fn record_answer(&mut self, answer: impl Into<String>, at: DateTime<Utc>) {
        self.result.push(answer.into());
        self.finished = Some(at);
    }

    pub fn is_answered(&self) -> bool {
        !self.result.is_empty()
    }

    pub fn was_cached(&self) -> bool {
        self.queried.is_empty()
    }

    pub fn response_time_ms(&self) -> Option<i64> {
        self.finished
            .map(|finished| (finished - self.started).num_milliseconds())
    }
}
