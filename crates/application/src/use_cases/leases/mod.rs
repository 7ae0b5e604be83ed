pub mod sync_leases;

pub use sync_leases::SyncLeasesUseCase;
