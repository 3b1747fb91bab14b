//! Sales ledger.
//!
//! Append-only record of sale events. Each sale belongs to exactly one registered
//! product, and a product can be sold at most once.

pub mod ledger;
pub mod sale;

pub use ledger::{SaleBackend, SaleLedger};
pub use sale::{RecordSale, Sale, SaleRecorded, SellerRef};
