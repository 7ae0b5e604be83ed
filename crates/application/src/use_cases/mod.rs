pub mod leases;

pub use leases::SyncLeasesUseCase;
