use serde::{Deserialize, Serialize};
use std::time::Duration;

/// dnsmasq log pipe and query correlation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LogWatchConfig {
    /// Named pipe dnsmasq writes its log to (`log-facility=`).
    /// Created on startup when missing.
    #[serde(default = "default_pipe_path")]
    pub pipe_path: String,

    /// Fixed window, measured from the `query[...]` line, after which a
    /// query is either emitted or discarded.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Raw lines buffered between the pipe reader and the classifier.
    /// The oldest line is dropped when full.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Completed queries buffered for the consumer before timers block.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl LogWatchConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

impl Default for LogWatchConfig {
    fn default() -> Self {
        Self {
            pipe_path: default_pipe_path(),
            query_timeout_ms: default_query_timeout_ms(),
            buffer_capacity: default_buffer_capacity(),
            event_capacity: default_event_capacity(),
        }
    }
}

fn default_pipe_path() -> String {
    "/var/run/dnsmasq/log.pipe".to_string()
}

fn default_query_timeout_ms() -> u64 {
    5000
}

fn default_buffer_capacity() -> usize {
    1000
}

fn default_event_capacity() -> usize {
    256
}
