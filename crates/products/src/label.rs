//! Scannable product label payload.
//!
//! Registration hands back a small JSON document that the manufacturer prints as a QR
//! code. Scanners send that document back verbatim; only `productSN` is needed to find
//! the product again.

use serde::{Deserialize, Serialize};

use chainverify_core::{LedgerError, LedgerResult, SerialNumber};

use crate::Product;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLabel {
    #[serde(rename = "manufacturerID")]
    pub manufacturer_id: String,
    #[serde(rename = "productName")]
    pub product_name: String,
    #[serde(rename = "productSN")]
    pub product_sn: String,
    #[serde(rename = "productBrand")]
    pub product_brand: String,
    #[serde(rename = "productPrice")]
    pub product_price: u64,
}

impl ProductLabel {
    pub fn for_product(product: &Product) -> Self {
        Self {
            manufacturer_id: product.manufacturer_id().to_string(),
            product_name: product.name().to_string(),
            product_sn: product.serial_number().to_string(),
            product_brand: product.brand().to_string(),
            product_price: product.price(),
        }
    }

    /// JSON text to encode into the printed code.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Extract the serial number from a scanned payload.
    ///
    /// Only `productSN` is required; other fields may be missing or of any type, since
    /// older labels printed the price as a string.
    pub fn parse_serial(payload: &str) -> LedgerResult<SerialNumber> {
        let value: serde_json::Value = serde_json::from_str(payload)
            .map_err(|e| LedgerError::validation(format!("invalid label payload: {e}")))?;

        match value.get("productSN").and_then(|v| v.as_str()) {
            Some(sn) => SerialNumber::parse(sn),
            None => Err(LedgerError::validation("label payload does not contain productSN")),
        }
    }
}
