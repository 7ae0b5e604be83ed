use chrono::{DateTime, Utc};
use ferrous_dnsmasq_domain::Query;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::debug;

/// Query under construction, shared between the ingestion loop and the
/// query's completion timer.
///
/// `gate` is closed exactly once, by the timer, before it reads the final
/// state. Appenders only ever *try* the field lock and re-check the gate
/// while holding it, so an append either lands before finalization or is
/// dropped.
struct InflightQuery {
    gate: AtomicBool,
    query: Mutex<Query>,
}

impl InflightQuery {
    fn new(query: Query) -> Self {
        Self {
            gate: AtomicBool::new(false),
            query: Mutex::new(query),
        }
    }

    fn try_update(&self, update: impl FnOnce(&mut Query)) -> bool {
        if self.gate.load(Ordering::Acquire) {
            return false;
        }
        let Ok(mut query) = self.query.try_lock() else {
            return false;
        };
        if self.gate.load(Ordering::Acquire) {
            return false;
        }
        update(&mut query);
        true
    }

    /// Closes the gate and takes the final state. Waits out an append that
    /// already holds the field lock.
    fn seal(&self) -> Query {
        self.gate.store(true, Ordering::Release);
        let mut query = self.query.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *query)
    }
}

#[derive(Debug, Default)]
struct TrackerMetrics {
    started: AtomicU64,
    emitted: AtomicU64,
    unanswered: AtomicU64,
    late_updates: AtomicU64,
}

/// Snapshot of [`QueryTracker`] counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    pub started: u64,
    pub emitted: u64,
    pub unanswered: u64,
    pub late_updates: u64,
    pub in_flight: usize,
}

/// Correlation table from dnsmasq transaction id to in-flight query.
///
/// Every `start` spawns a completion timer that fires `timeout` after the
/// query line (activity does not renew it) or as soon as `shutdown` is
/// cancelled. On fire the query is emitted to `completed` if it recorded at
/// least one answer, then removed from the table.
///
/// Membership is guarded by one reader/writer lock; field updates only take
/// the per-entry gate.
pub struct QueryTracker {
    ongoing: RwLock<HashMap<String, Arc<InflightQuery>>>,
    completed: mpsc::Sender<Query>,
    timeout: Duration,
    shutdown: CancellationToken,
    timers: TaskTracker,
    metrics: TrackerMetrics,
}

impl QueryTracker {
    pub fn new(
        completed: mpsc::Sender<Query>,
        timeout: Duration,
        shutdown: CancellationToken,
    ) -> Arc<Self> {
        Arc::new(Self {
            ongoing: RwLock::new(HashMap::with_capacity(100)),
            completed,
            timeout,
            shutdown,
            timers: TaskTracker::new(),
            metrics: TrackerMetrics::default(),
        })
    }

    /// Starts tracking `id`. A previous query still in flight under the same
    /// id keeps its own timer but stops receiving updates.
    pub fn start(
        self: &Arc<Self>,
        id: &str,
        made_by: &str,
        domain: &str,
        started: DateTime<Utc>,
    ) {
        let entry = Arc::new(InflightQuery::new(Query::new(domain, made_by, started)));

        let replaced = self
            .ongoing
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), Arc::clone(&entry));
        if replaced.is_some() {
            debug!(id, "Query id reused while previous query still in flight");
        }
        self.metrics.started.fetch_add(1, Ordering::Relaxed);

        let tracker = Arc::clone(self);
        let id = id.to_string();
        self.timers.spawn(async move {
            tokio::select! {
                _ = tracker.shutdown.cancelled() => {}
                _ = tokio::time::sleep(tracker.timeout) => {}
            }
            tracker.finalize(&id, &entry).await;
        });
    }

    /// Returns `false` when the update was dropped (unknown id or the query
    /// is already being finalized).
    pub fn record_forward(&self, id: &str, server: &str) -> bool {
        self.update(id, |query| query.record_forward(server))
    }

    pub fn record_answer(&self, id: &str, answer: &str, at: DateTime<Utc>) -> bool {
        self.update(id, |query| query.record_answer(answer, at))
    }

    fn update(&self, id: &str, apply: impl FnOnce(&mut Query)) -> bool {
        let Some(entry) = self.get(id) else {
            return false;
        };
        let applied = entry.try_update(apply);
        if !applied {
            self.metrics.late_updates.fetch_add(1, Ordering::Relaxed);
            debug!(id, "Dropped update for query being finalized");
        }
        applied
    }

    fn get(&self, id: &str) -> Option<Arc<InflightQuery>> {
        self.ongoing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    async fn finalize(&self, id: &str, entry: &Arc<InflightQuery>) {
        let query = entry.seal();

        if query.is_answered() {
            debug!(
                id,
                domain = %query.domain,
                answers = query.result.len(),
                "Query completed"
            );
            if self.completed.send(query).await.is_ok() {
                self.metrics.emitted.fetch_add(1, Ordering::Relaxed);
            } else {
                debug!(id, "Query consumer gone, dropping completed query");
            }
        } else {
            self.metrics.unanswered.fetch_add(1, Ordering::Relaxed);
            debug!(id, domain = %query.domain, "Query expired without answer");
        }

        let mut ongoing = self.ongoing.write().unwrap_or_else(PoisonError::into_inner);
        if ongoing
            .get(id)
            .is_some_and(|current| Arc::ptr_eq(current, entry))
        {
            ongoing.remove(id);
        }
    }

    /// Stops accepting timers and waits until every started timer finished.
    pub async fn drain(&self) {
        self.timers.close();
        self.timers.wait().await;
    }

    pub fn in_flight(&self) -> usize {
        self.ongoing
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn stats(&self) -> TrackerStats {
        TrackerStats {
            started: self.metrics.started.load(Ordering::Relaxed),
            emitted: self.metrics.emitted.load(Ordering::Relaxed),
            unanswered: self.metrics.unanswered.load(Ordering::Relaxed),
            late_updates: self.metrics.late_updates.load(Ordering::Relaxed),
            in_flight: self.in_flight(),
        }
    }
}
