//! Infrastructure layer: persistence backends for the ledger registries.

pub mod record_store;

pub use record_store::InMemoryRecordStore;
#[cfg(feature = "postgres")]
pub use record_store::PostgresRecordStore;
