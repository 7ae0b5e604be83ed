pub mod lease_watch;
pub mod runner;

pub use lease_watch::LeaseWatchJob;
pub use runner::JobRunner;
