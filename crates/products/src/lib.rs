//! Products registry.
//!
//! Authoritative record of manufactured products keyed by serial number. A product is
//! registered once and never changes afterwards.

pub mod label;
pub mod product;
pub mod store;

pub use label::ProductLabel;
pub use product::{Product, ProductRegistered, RegisterProduct};
pub use store::{ProductBackend, ProductStore};
