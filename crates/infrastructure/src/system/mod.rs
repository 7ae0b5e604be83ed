pub mod lease_reader;

pub use lease_reader::{parse_leases, LeaseFileReader};
