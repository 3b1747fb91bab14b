//! Read-only views over the ledger registries.
//!
//! Nothing in this crate writes: every operation is a projection of the products,
//! sellers and sales registries as they are at the time of the call.

pub mod engine;
pub mod history;
pub mod inventory;

pub use engine::{SellerDisplay, Verdict, VerificationEngine, VerificationResult};
pub use history::{HistoryEntry, PurchaseStatus};
pub use inventory::{InventoryEntry, SellerInventory, StockStatus};

#[cfg(test)]
pub(crate) mod test_support;
