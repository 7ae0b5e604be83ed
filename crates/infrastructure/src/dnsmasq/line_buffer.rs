use ferrous_dnsmasq_domain::LogLine;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::Notify;

pub const DEFAULT_LINE_BUFFER_CAPACITY: usize = 1000;

/// Fixed-capacity queue between the pipe reader and the classifier.
///
/// `push` never waits: when the buffer is full the oldest buffered line is
/// discarded to admit the new one, so the pipe writer (dnsmasq) is never
/// stalled by a slow consumer. Surviving lines keep their arrival order.
///
/// Single consumer. After `close` the consumer drains what is left and then
/// receives `None`.
pub struct LineBuffer {
    lines: Mutex<VecDeque<LogLine>>,
    capacity: usize,
    available: Notify,
    closed: AtomicBool,
    dropped: AtomicU64,
}

impl LineBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            available: Notify::new(),
            closed: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
        }
    }

    /// Returns `true` when an older line had to be discarded.
    pub fn push(&self, line: LogLine) -> bool {
        let evicted = {
            let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
            let evicted = if lines.len() >= self.capacity {
                lines.pop_front().is_some()
            } else {
                false
            };
            lines.push_back(line);
            evicted
        };

        if evicted {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.available.notify_one();
        evicted
    }

    pub fn try_pop(&self) -> Option<LogLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    /// Waits for the next line; `None` once closed and empty.
    pub async fn pop(&self) -> Option<LogLine> {
        loop {
            if let Some(line) = self.try_pop() {
                return Some(line);
            }
            if self.closed.load(Ordering::Acquire) {
                // a push may have raced the close
                return self.try_pop();
            }
            self.available.notified().await;
        }
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.available.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn len(&self) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Lines discarded because the buffer was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LINE_BUFFER_CAPACITY)
    }
}
