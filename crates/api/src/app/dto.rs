use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chainverify_core::{BuyerCode, LedgerError, LedgerResult, ManufacturerId, SellerCode, SerialNumber};
use chainverify_products::{Product, ProductLabel, RegisterProduct};
use chainverify_sales::{RecordSale, Sale, SellerRef};
use chainverify_sellers::RegisterSeller;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterProductRequest {
    pub serial_number: String,
    pub manufacturer_id: String,
    pub name: String,
    pub brand: String,
    /// Minor currency units.
    pub price: u64,
}

impl RegisterProductRequest {
    pub fn into_command(self) -> LedgerResult<RegisterProduct> {
        Ok(RegisterProduct {
            serial_number: SerialNumber::parse(self.serial_number)?,
            manufacturer_id: ManufacturerId::parse(self.manufacturer_id)?,
            name: self.name,
            brand: self.brand,
            price: self.price,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterSellerRequest {
    pub seller_code: String,
    pub name: String,
    pub brand: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub manager: String,
    #[serde(default)]
    pub address: String,
    pub manufacturer_id: String,
}

impl RegisterSellerRequest {
    pub fn into_command(self) -> LedgerResult<RegisterSeller> {
        Ok(RegisterSeller {
            seller_code: SellerCode::parse(self.seller_code)?,
            name: self.name,
            brand: self.brand,
            phone: self.phone,
            manager: self.manager,
            address: self.address,
            manufacturer_id: ManufacturerId::parse(self.manufacturer_id)?,
        })
    }
}

/// `seller` is either a registered seller code or an `0x…` account address.
#[derive(Debug, Deserialize)]
pub struct RecordSaleRequest {
    pub serial_number: String,
    pub seller: String,
    pub buyer_code: String,
}

impl RecordSaleRequest {
    pub fn into_command(self) -> LedgerResult<RecordSale> {
        Ok(RecordSale {
            serial_number: SerialNumber::parse(self.serial_number)?,
            seller_ref: SellerRef::parse(&self.seller)?,
            buyer_code: BuyerCode::parse(self.buyer_code)?,
        })
    }
}

/// Either the serial number or the scanned label payload identifies the product.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub serial_number: Option<String>,
    pub payload: Option<String>,
    pub buyer_code: String,
}

impl VerifyRequest {
    pub fn serial_number(&self) -> LedgerResult<SerialNumber> {
        match (&self.serial_number, &self.payload) {
            (Some(serial), _) => SerialNumber::parse(serial.as_str()),
            (None, Some(payload)) => ProductLabel::parse_serial(payload),
            (None, None) => Err(LedgerError::validation("either serial_number or payload is required")),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryRequest {
    pub serial_numbers: Vec<String>,
}

impl HistoryRequest {
    pub fn parse_serials(self) -> LedgerResult<Vec<SerialNumber>> {
        self.serial_numbers.into_iter().map(SerialNumber::parse).collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub manufacturer_id: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct RegisteredProductResponse {
    pub product: Product,
    /// Scannable label payload.
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

/// Public view of a sale. The buyer code stays inside the ledger.
#[derive(Debug, Serialize)]
pub struct SaleView {
    pub serial_number: SerialNumber,
    pub seller: SellerRef,
    pub sold_at: DateTime<Utc>,
}

impl From<&Sale> for SaleView {
    fn from(sale: &Sale) -> Self {
        Self {
            serial_number: sale.serial_number().clone(),
            seller: sale.seller_ref().clone(),
            sold_at: sale.sold_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_prefers_serial_number_over_payload() {
        let req = VerifyRequest {
            serial_number: Some("SN1".to_string()),
            payload: Some(r#"{"productSN":"SN2"}"#.to_string()),
            buyer_code: "X".to_string(),
        };
        assert_eq!(req.serial_number().unwrap().as_str(), "SN1");
    }

    #[test]
    fn verify_reads_serial_from_scanned_payload() {
        let req = VerifyRequest {
            serial_number: None,
            payload: Some(r#"{"manufacturerID":"M1","productSN":"SN2"}"#.to_string()),
            buyer_code: "X".to_string(),
        };
        assert_eq!(req.serial_number().unwrap().as_str(), "SN2");
    }

    #[test]
    fn verify_without_product_reference_is_invalid() {
        let req = VerifyRequest {
            serial_number: None,
            payload: None,
            buyer_code: "X".to_string(),
        };
        assert!(matches!(req.serial_number(), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn sale_request_rejects_blank_buyer_code() {
        let req = RecordSaleRequest {
            serial_number: "SN1".to_string(),
            seller: "SELLER1".to_string(),
            buyer_code: " ".to_string(),
        };
        assert!(matches!(req.into_command(), Err(LedgerError::Validation(_))));
    }
}
