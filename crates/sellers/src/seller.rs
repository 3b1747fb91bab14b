use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chainverify_core::{Entity, IndexedRecord, LedgerError, LedgerResult, ManufacturerId, SellerCode};
use chainverify_events::Event;

/// A registered seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seller {
    seller_code: SellerCode,
    name: String,
    brand: String,
    phone: String,
    manager: String,
    address: String,
    manufacturer_id: ManufacturerId,
    registered_at: DateTime<Utc>,
}

impl Seller {
    pub fn register(cmd: RegisterSeller, registered_at: DateTime<Utc>) -> LedgerResult<Self> {
        cmd.validate()?;

        Ok(Self {
            seller_code: cmd.seller_code,
            name: cmd.name,
            brand: cmd.brand,
            phone: cmd.phone,
            manager: cmd.manager,
            address: cmd.address,
            manufacturer_id: cmd.manufacturer_id,
            registered_at,
        })
    }

    pub fn seller_code(&self) -> &SellerCode {
        &self.seller_code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn manager(&self) -> &str {
        &self.manager
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Manufacturer vouching for this seller.
    pub fn manufacturer_id(&self) -> &ManufacturerId {
        &self.manufacturer_id
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }
}

impl Entity for Seller {
    type Id = SellerCode;

    fn id(&self) -> &Self::Id {
        &self.seller_code
    }
}

impl IndexedRecord for Seller {}

/// Command: RegisterSeller.
///
/// Contact fields (phone, manager, address) are free-form and may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSeller {
    pub seller_code: SellerCode,
    pub name: String,
    pub brand: String,
    pub phone: String,
    pub manager: String,
    pub address: String,
    pub manufacturer_id: ManufacturerId,
}

impl RegisterSeller {
    fn validate(&self) -> LedgerResult<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::validation("seller name cannot be empty"));
        }
        if self.brand.trim().is_empty() {
            return Err(LedgerError::validation("seller brand cannot be empty"));
        }
        Ok(())
    }
}

/// Event: SellerRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerRegistered {
    pub seller: Seller,
}

impl From<&Seller> for SellerRegistered {
    fn from(seller: &Seller) -> Self {
        Self {
            seller: seller.clone(),
        }
    }
}

impl Event for SellerRegistered {
    fn event_type(&self) -> &'static str {
        "sellers.seller.registered"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.seller.registered_at
    }
}
