use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use chainverify_core::{Insertion, LedgerError, LedgerResult, RecordStore, SellerCode};

use crate::seller::{RegisterSeller, Seller};

/// Backend holding seller records.
pub type SellerBackend = Arc<dyn RecordStore<SellerCode, Seller>>;

/// Sellers registry.
pub struct SellerStore {
    records: SellerBackend,
}

impl SellerStore {
    pub fn new(records: SellerBackend) -> Self {
        Self { records }
    }

    /// Register a new seller; fails with `AlreadyExists` when the code is taken.
    pub fn register(&self, cmd: RegisterSeller) -> LedgerResult<Seller> {
        let seller = Seller::register(cmd, Utc::now())?;
        let code = seller.seller_code().clone();

        match self.records.insert_if_absent(code.clone(), seller.clone())? {
            Insertion::Inserted => {
                info!(
                    seller_code = %code,
                    manufacturer_id = %seller.manufacturer_id(),
                    "seller registered"
                );
                Ok(seller)
            }
            Insertion::AlreadyPresent => {
                debug!(seller_code = %code, "duplicate seller registration rejected");
                Err(LedgerError::already_exists(code.into_inner()))
            }
        }
    }

    pub fn get(&self, code: &SellerCode) -> LedgerResult<Option<Seller>> {
        Ok(self.records.get(code)?)
    }

    pub fn exists(&self, code: &SellerCode) -> LedgerResult<bool> {
        Ok(self.records.contains(code)?)
    }
}
