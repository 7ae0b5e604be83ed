#![allow(dead_code)]
use async_trait::async_trait;
use ferrous_dnsmasq_application::ports::LineSource;
use ferrous_dnsmasq_domain::{DomainError, LogLine};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Line source fed from the test through [`MockLineFeed`].
/// Dropping every feed ends the stream.
pub struct MockLineSource {
    lines: mpsc::UnboundedReceiver<Result<String, DomainError>>,
    read_count: Arc<AtomicU64>,
}

#[derive(Clone)]
pub struct MockLineFeed {
    lines: mpsc::UnboundedSender<Result<String, DomainError>>,
    read_count: Arc<AtomicU64>,
}

impl MockLineSource {
    pub fn new() -> (Self, MockLineFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        let read_count = Arc::new(AtomicU64::new(0));
        (
            Self {
                lines: rx,
                read_count: Arc::clone(&read_count),
            },
            MockLineFeed {
                lines: tx,
                read_count,
            },
        )
    }

    /// Source that yields `lines` and then ends.
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (source, feed) = Self::new();
        for line in lines {
            feed.send(line);
        }
        source
    }
}

impl MockLineFeed {
    pub fn send(&self, line: impl Into<String>) {
        let _ = self.lines.send(Ok(line.into()));
    }

    pub fn send_all<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.send(line);
        }
    }

    pub fn fail(&self, error: DomainError) {
        let _ = self.lines.send(Err(error));
    }

    pub fn read_count(&self) -> u64 {
        self.read_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl LineSource for MockLineSource {
    async fn next_line(&mut self) -> Result<Option<LogLine>, DomainError> {
        match self.lines.recv().await {
            Some(Ok(text)) => {
                self.read_count.fetch_add(1, Ordering::Relaxed);
                Ok(Some(LogLine::new(text)))
            }
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }
}
