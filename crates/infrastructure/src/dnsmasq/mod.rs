//! dnsmasq log query correlation.
//!
//! A reader task moves lines from a [`LineSource`] into a drop-oldest
//! [`LineBuffer`]. The ingestion loop classifies each line and feeds the
//! [`QueryTracker`], which finalizes every query once its window elapses.
//!
//! [`LineSource`]: ferrous_dnsmasq_application::ports::LineSource

pub mod classifier;
pub mod line_buffer;
pub mod line_source;
pub mod tracker;
pub mod watcher;

pub use classifier::{classify_line, LogEvent};
pub use line_buffer::{LineBuffer, DEFAULT_LINE_BUFFER_CAPACITY};
pub use line_source::{open_log_pipe, PipeLineSource, StreamLineSource};
pub use tracker::{QueryTracker, TrackerStats};
pub use watcher::DnsmasqLogWatcher;
