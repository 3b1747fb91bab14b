//! `chainverify-core`: ledger foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the product, seller and
//! sale registries: identifiers, the error taxonomy and the persistence port the
//! registries are written against. Backends live in `chainverify-infra`.

pub mod entity;
pub mod error;
pub mod id;
pub mod store;

pub use entity::Entity;
pub use error::{LedgerError, LedgerResult, StorageError};
pub use id::{BuyerCode, ManufacturerId, SellerCode, SerialNumber};
pub use store::{IndexedRecord, Insertion, RecordKey, RecordStore};
