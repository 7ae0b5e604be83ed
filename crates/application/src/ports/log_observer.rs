use std::sync::Arc;

/// Callback invoked once per raw log line with whether the line was
/// related to a DNS query. Purely observational.
pub type LogObserver = Arc<dyn Fn(&str, bool) + Send + Sync>;
