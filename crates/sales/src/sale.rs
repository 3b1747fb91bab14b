use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chainverify_core::{BuyerCode, Entity, IndexedRecord, LedgerResult, SellerCode, SerialNumber};
use chainverify_events::Event;

/// Who sold the product.
///
/// Sales are recorded either against a registered seller code, or against an external
/// account (e.g. the wallet address that submitted the sale) that the ledger does not
/// know about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SellerRef {
    Code(SellerCode),
    Account(String),
}

impl SellerRef {
    /// Parse caller input: `0x` followed by 40 hex digits is an account address, anything
    /// else a seller code.
    pub fn parse(raw: &str) -> LedgerResult<Self> {
        if is_account_address(raw) {
            return Ok(Self::Account(raw.to_string()));
        }
        Ok(Self::Code(SellerCode::parse(raw)?))
    }

    pub fn seller_code(&self) -> Option<&SellerCode> {
        match self {
            Self::Code(code) => Some(code),
            Self::Account(_) => None,
        }
    }
}

impl core::fmt::Display for SellerRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Code(code) => core::fmt::Display::fmt(code, f),
            Self::Account(addr) => f.write_str(addr),
        }
    }
}

fn is_account_address(raw: &str) -> bool {
    match raw.strip_prefix("0x") {
        Some(hex) => hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

/// A recorded sale, keyed by the serial number of the product sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    serial_number: SerialNumber,
    seller_ref: SellerRef,
    buyer_code: BuyerCode,
    sold_at: DateTime<Utc>,
}

impl Sale {
    pub fn record(cmd: RecordSale, sold_at: DateTime<Utc>) -> Self {
        Self {
            serial_number: cmd.serial_number,
            seller_ref: cmd.seller_ref,
            buyer_code: cmd.buyer_code,
            sold_at,
        }
    }

    pub fn serial_number(&self) -> &SerialNumber {
        &self.serial_number
    }

    pub fn seller_ref(&self) -> &SellerRef {
        &self.seller_ref
    }

    pub fn buyer_code(&self) -> &BuyerCode {
        &self.buyer_code
    }

    pub fn sold_at(&self) -> DateTime<Utc> {
        self.sold_at
    }

    /// Case-insensitive comparison against the buyer code stored at sale time.
    pub fn buyer_code_matches(&self, candidate: &str) -> bool {
        self.buyer_code.matches(candidate)
    }
}

impl Entity for Sale {
    type Id = SerialNumber;

    fn id(&self) -> &Self::Id {
        &self.serial_number
    }
}

impl IndexedRecord for Sale {}

/// Command: RecordSale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSale {
    pub serial_number: SerialNumber,
    pub seller_ref: SellerRef,
    pub buyer_code: BuyerCode,
}

/// Event: SaleRecorded.
///
/// Published to subscribers; never carries the buyer code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecorded {
    pub serial_number: SerialNumber,
    pub seller_ref: SellerRef,
    pub sold_at: DateTime<Utc>,
}

impl From<&Sale> for SaleRecorded {
    fn from(sale: &Sale) -> Self {
        Self {
            serial_number: sale.serial_number.clone(),
            seller_ref: sale.seller_ref.clone(),
            sold_at: sale.sold_at,
        }
    }
}

impl Event for SaleRecorded {
    fn event_type(&self) -> &'static str {
        "sales.sale.recorded"
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.sold_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainverify_core::LedgerError;

    #[test]
    fn seller_ref_parses_account_addresses() {
        let addr = "0x1a2b3c4d5e6f7a8b9c0d1e2f3a4b5c6d7e8f9a0b";
        assert_eq!(SellerRef::parse(addr).unwrap(), SellerRef::Account(addr.to_string()));
    }

    #[test]
    fn seller_ref_falls_back_to_seller_code() {
        for raw in ["SELLER1", "0x123", "0xZZ2b3c4d5e6f7a8b9c0d1e2f3a4b5c6d7e8f9a0b"] {
            assert_eq!(
                SellerRef::parse(raw).unwrap(),
                SellerRef::Code(SellerCode::parse(raw).unwrap())
            );
        }
        assert!(matches!(SellerRef::parse(""), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn recorded_event_omits_buyer_code() {
        let sale = Sale::record(
            RecordSale {
                serial_number: SerialNumber::parse("SN1").unwrap(),
                seller_ref: SellerRef::parse("SELLER1").unwrap(),
                buyer_code: BuyerCode::parse("VALID123").unwrap(),
            },
            Utc::now(),
        );

        let json = serde_json::to_string(&SaleRecorded::from(&sale)).unwrap();
        assert!(!json.contains("VALID123"));
        assert!(json.contains("SELLER1"));
    }

    #[test]
    fn buyer_code_comparison_ignores_case() {
        let sale = Sale::record(
            RecordSale {
                serial_number: SerialNumber::parse("SN1").unwrap(),
                seller_ref: SellerRef::parse("SELLER1").unwrap(),
                buyer_code: BuyerCode::parse("VALID123").unwrap(),
            },
            Utc::now(),
        );
        assert!(sale.buyer_code_matches("valid123"));
        assert!(!sale.buyer_code_matches("WRONG"));
    }
}
