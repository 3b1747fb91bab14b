//! [`RecordStore`](chainverify_core::RecordStore) backends.
//!
//! - `in_memory`: process-local, used for dev, tests and single-instance deployments
//! - `postgres`: durable, shared between instances (cargo feature `postgres`)

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use in_memory::InMemoryRecordStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresRecordStore;
