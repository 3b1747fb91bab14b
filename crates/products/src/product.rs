use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chainverify_core::{Entity, IndexedRecord, LedgerError, LedgerResult, ManufacturerId, SerialNumber};
use chainverify_events::Event;

/// A registered product.
///
/// Created exactly once by [`ProductStore::register`](crate::ProductStore::register); there
/// is no way to change it afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    serial_number: SerialNumber,
    manufacturer_id: ManufacturerId,
    name: String,
    brand: String,
    /// Price in the smallest currency unit.
    price: u64,
    registered_at: DateTime<Utc>,
}

impl Product {
    /// Build the record for a registration committed at `registered_at`.
    pub fn register(cmd: RegisterProduct, registered_at: DateTime<Utc>) -> LedgerResult<Self> {
        cmd.validate()?;

        Ok(Self {
            serial_number: cmd.serial_number,
            manufacturer_id: cmd.manufacturer_id,
            name: cmd.name,
            brand: cmd.brand,
            price: cmd.price,
            registered_at,
        })
    }

    pub fn serial_number(&self) -> &SerialNumber {
        &self.serial_number
    }

    pub fn manufacturer_id(&self) -> &ManufacturerId {
        &self.manufacturer_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn price(&self) -> u64 {
        self.price
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }
}

impl Entity for Product {
    type Id = SerialNumber;

    fn id(&self) -> &Self::Id {
        &self.serial_number
    }
}

/// Products are listed by manufacturer.
impl IndexedRecord for Product {
    fn index_key(&self) -> Option<&str> {
        Some(self.manufacturer_id.as_str())
    }
}

/// Command: RegisterProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterProduct {
    pub serial_number: SerialNumber,
    pub manufacturer_id: ManufacturerId,
    pub name: String,
    pub brand: String,
    pub price: u64,
}

impl RegisterProduct {
    fn validate(&self) -> LedgerResult<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::validation("product name cannot be empty"));
        }
        if self.brand.trim().is_empty() {
            return Err(LedgerError::validation("product brand cannot be empty"));
        }
        Ok(())
    }
}

/// Event: ProductRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRegistered {
    pub product: Product,
}

impl From<&Product> for ProductRegistered {
    fn from(product: &Product) -> Self {
        Self {
            product: product.clone(),
        }
    }
}

impl Event for ProductRegistered {
    fn event_type(&self) -> &'static str {
        "products.product.registered"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.product.registered_at
    }
}
