//! Sellers registry.
//!
//! Resellers registered by (and vouched for by) a manufacturer, keyed by seller code.
//! Sellers are looked up by code only; there is no enumeration.

pub mod seller;
pub mod store;

pub use seller::{RegisterSeller, Seller, SellerRegistered};
pub use store::{SellerBackend, SellerStore};
