use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use chainverify_core::{
    Insertion, LedgerError, LedgerResult, ManufacturerId, RecordStore, SerialNumber,
};

use crate::product::{Product, RegisterProduct};

/// Backend holding product records.
pub type ProductBackend = Arc<dyn RecordStore<SerialNumber, Product>>;

/// Products registry.
///
/// The backend lists products by manufacturer (see [`Product`]'s `IndexedRecord` impl),
/// so manufacturer-scoped listings never scan the whole catalog and every store sharing a
/// backend sees the same listing. The store holds no state of its own.
pub struct ProductStore {
    records: ProductBackend,
}

impl ProductStore {
    pub fn new(records: ProductBackend) -> Self {
        Self { records }
    }

    /// Register a new product.
    ///
    /// Fails with `AlreadyExists` when the serial number is taken. Uniqueness and the
    /// manufacturer listing are both settled by the backend insert.
    pub fn register(&self, cmd: RegisterProduct) -> LedgerResult<Product> {
        let product = Product::register(cmd, Utc::now())?;
        let serial = product.serial_number().clone();

        match self.records.insert_if_absent(serial.clone(), product.clone())? {
            Insertion::Inserted => {
                info!(
                    serial_number = %product.serial_number(),
                    manufacturer_id = %product.manufacturer_id(),
                    "product registered"
                );
                Ok(product)
            }
            Insertion::AlreadyPresent => {
                debug!(serial_number = %serial, "duplicate product registration rejected");
                Err(LedgerError::already_exists(serial.into_inner()))
            }
        }
    }

    pub fn get(&self, serial: &SerialNumber) -> LedgerResult<Option<Product>> {
        Ok(self.records.get(serial)?)
    }

    pub fn exists(&self, serial: &SerialNumber) -> LedgerResult<bool> {
        Ok(self.records.contains(serial)?)
    }

    /// All serial numbers in registration order.
    pub fn list_all(&self) -> LedgerResult<Vec<SerialNumber>> {
        Ok(self.records.keys()?)
    }

    /// Serial numbers registered by `manufacturer`, in registration order.
    pub fn list_by_manufacturer(&self, manufacturer: &ManufacturerId) -> LedgerResult<Vec<SerialNumber>> {
        Ok(self.records.keys_by_index(manufacturer.as_str())?)
    }
}
