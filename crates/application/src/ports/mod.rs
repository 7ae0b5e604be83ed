mod lease_reader;
mod line_source;
mod log_observer;

pub use lease_reader::LeaseReader;
pub use line_source::LineSource;
pub use log_observer::LogObserver;
