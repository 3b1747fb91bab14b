use serde::Serialize;
use tracing::warn;

use chainverify_core::{LedgerError, LedgerResult, ManufacturerId, SellerCode};
use chainverify_products::Product;
use chainverify_sellers::Seller;

use crate::engine::VerificationEngine;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Registered,
    Sold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryEntry {
    pub product: Product,
    pub status: StockStatus,
}

/// Products a seller can offer: everything registered by the seller's manufacturer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerInventory {
    pub seller: Seller,
    pub items: Vec<InventoryEntry>,
}

impl SellerInventory {
    pub fn available(&self) -> impl Iterator<Item = &InventoryEntry> {
        self.items.iter().filter(|e| e.status == StockStatus::Registered)
    }
}

impl VerificationEngine {
    /// Inventory of the seller's manufacturer, in registration order.
    pub fn seller_inventory(&self, code: &SellerCode) -> LedgerResult<SellerInventory> {
        let seller = self
            .sellers
            .get(code)?
            .ok_or_else(|| LedgerError::seller_not_found(code.as_str()))?;

        let items = self.manufacturer_inventory(seller.manufacturer_id())?;
        Ok(SellerInventory { seller, items })
    }

    pub fn manufacturer_inventory(&self, manufacturer: &ManufacturerId) -> LedgerResult<Vec<InventoryEntry>> {
        let serials = self.products.list_by_manufacturer(manufacturer)?;
        let mut items = Vec::with_capacity(serials.len());

        for serial in serials {
            let Some(product) = self.products.get(&serial)? else {
                // Indexed but unreadable: the backend lost a record behind our back.
                warn!(serial_number = %serial, "indexed product missing from backend");
                continue;
            };
            let status = if self.sales.sale_exists(&serial)? {
                StockStatus::Sold
            } else {
                StockStatus::Registered
            };
            items.push(InventoryEntry { product, status });
        }

        Ok(items)
    }
}
