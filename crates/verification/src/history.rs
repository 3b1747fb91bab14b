use chrono::{DateTime, Utc};
use serde::Serialize;

use chainverify_core::{LedgerResult, SerialNumber};
use chainverify_products::Product;

use crate::engine::{SellerDisplay, VerificationEngine};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    /// No product with this serial number.
    Unregistered,
    /// Registered, not sold.
    Available,
    /// Sold.
    Completed,
}

/// One row of a purchase history. Never carries the buyer code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub serial_number: SerialNumber,
    pub status: PurchaseStatus,
    pub product: Option<Product>,
    pub seller: Option<SellerDisplay>,
    pub sold_at: Option<DateTime<Utc>>,
}

impl VerificationEngine {
    /// Status of each serial number, in the order given.
    pub fn purchase_history(&self, serials: &[SerialNumber]) -> LedgerResult<Vec<HistoryEntry>> {
        serials.iter().map(|serial| self.history_entry(serial)).collect()
    }

    fn history_entry(&self, serial: &SerialNumber) -> LedgerResult<HistoryEntry> {
        let mut entry = HistoryEntry {
            serial_number: serial.clone(),
            status: PurchaseStatus::Unregistered,
            product: None,
            seller: None,
            sold_at: None,
        };

        let Some(product) = self.products.get(serial)? else {
            return Ok(entry);
        };
        entry.product = Some(product);
        entry.status = PurchaseStatus::Available;

        if let Some(sale) = self.sales.get_sale(serial)? {
            entry.status = PurchaseStatus::Completed;
            entry.seller = Some(self.display_seller(sale.seller_ref()));
            entry.sold_at = Some(sale.sold_at());
        }

        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Ledger, sn};

    #[test]
    fn history_reports_each_serial_in_request_order() {
        let ledger = Ledger::new();
        ledger.register_product("SN1", "M1");
        ledger.register_product("SN2", "M1");
        ledger.register_seller("SELLER1", "M1");
        ledger.sell("SN2", "SELLER1", "VALID123");

        let history = ledger
            .engine
            .purchase_history(&[sn("SN2"), sn("SN-missing"), sn("SN1")])
            .unwrap();

        let statuses: Vec<_> = history.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                PurchaseStatus::Completed,
                PurchaseStatus::Unregistered,
                PurchaseStatus::Available
            ]
        );

        let sold = &history[0];
        assert_eq!(sold.seller.as_ref().unwrap().name.as_deref(), Some("Shop SELLER1"));
        assert!(sold.sold_at.is_some());
        assert!(history[1].product.is_none());
        assert!(history[2].seller.is_none());
    }

    #[test]
    fn history_never_exposes_buyer_code() {
        let ledger = Ledger::new();
        ledger.register_product("SN1", "M1");
        ledger.register_seller("SELLER1", "M1");
        ledger.sell("SN1", "SELLER1", "SECRETBUYER");

        let history = ledger.engine.purchase_history(&[sn("SN1")]).unwrap();
        let json = serde_json::to_string(&history).unwrap();

        assert!(json.contains("completed"));
        assert!(!json.contains("SECRETBUYER"));
    }

    #[test]
    fn empty_request_gives_empty_history() {
        let ledger = Ledger::new();
        assert!(ledger.engine.purchase_history(&[]).unwrap().is_empty());
    }
}
