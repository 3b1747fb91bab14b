//! Strongly-typed identifiers used across the ledger.
//!
//! All identifiers are opaque strings: they are stored exactly as supplied (no trimming,
//! no case folding). The only rule enforced here is that they are not blank.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, StorageError};
use crate::store::RecordKey;

/// Serial number of a physical product instance (primary key of a Product).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerialNumber(String);

/// Code of a registered seller (primary key of a Seller).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SellerCode(String);

/// Identifier of the manufacturer that registered a product or vouches for a seller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ManufacturerId(String);

macro_rules! impl_text_id {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Parse an identifier, rejecting blank input.
            pub fn parse(value: impl Into<String>) -> Result<Self, LedgerError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(LedgerError::validation(concat!($name, " cannot be empty")));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $t {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $t {
            type Error = LedgerError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl RecordKey for $t {
            fn as_record_key(&self) -> &str {
                &self.0
            }

            fn from_record_key(raw: String) -> Result<Self, StorageError> {
                Self::parse(raw).map_err(|e| StorageError::corrupt(format!("{}: {}", $name, e)))
            }
        }
    };
}

impl_text_id!(SerialNumber, "serial number");
impl_text_id!(SellerCode, "seller code");
impl_text_id!(ManufacturerId, "manufacturer id");

/// Consumer-supplied code recorded at sale time and later required to prove authenticity.
///
/// The code is a shared secret between buyer and ledger, so `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BuyerCode(String);

impl BuyerCode {
    pub fn parse(value: impl Into<String>) -> Result<Self, LedgerError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(LedgerError::validation("buyer code cannot be empty"));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact comparison, ignoring case.
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate || self.0.to_lowercase() == candidate.to_lowercase()
    }
}

impl core::fmt::Debug for BuyerCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("BuyerCode(<redacted>)")
    }
}

impl TryFrom<String> for BuyerCode {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<BuyerCode> for String {
    fn from(value: BuyerCode) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_identifiers_are_rejected() {
        assert!(matches!(SerialNumber::parse(""), Err(LedgerError::Validation(_))));
        assert!(matches!(SellerCode::parse("   "), Err(LedgerError::Validation(_))));
        assert!(matches!(ManufacturerId::parse("\t"), Err(LedgerError::Validation(_))));
        assert!(matches!(BuyerCode::parse(" "), Err(LedgerError::Validation(_))));
    }

    #[test]
    fn identifiers_are_kept_verbatim() {
        let sn = SerialNumber::parse(" SN-1 ").unwrap();
        assert_eq!(sn.as_str(), " SN-1 ");
        assert_ne!(sn, SerialNumber::parse("SN-1").unwrap());
    }

    #[test]
    fn serde_rejects_blank_identifiers() {
        let ok: SerialNumber = serde_json::from_str("\"SN1\"").unwrap();
        assert_eq!(ok.as_str(), "SN1");
        assert!(serde_json::from_str::<SerialNumber>("\"\"").is_err());
    }

    #[test]
    fn buyer_code_matches_ignoring_case_only() {
        let code = BuyerCode::parse("VALID123").unwrap();
        assert!(code.matches("VALID123"));
        assert!(code.matches("valid123"));
        assert!(code.matches("VaLiD123"));
        assert!(!code.matches("VALID12"));
        assert!(!code.matches(" VALID123"));
        assert!(!code.matches("WRONG"));
    }

    #[test]
    fn buyer_code_debug_is_redacted() {
        let code = BuyerCode::parse("secret-code").unwrap();
        assert!(!format!("{code:?}").contains("secret-code"));
    }

    #[test]
    fn record_key_roundtrip_flags_corruption() {
        let code = SellerCode::from_record_key("S1".to_string()).unwrap();
        assert_eq!(code.as_record_key(), "S1");
        assert!(matches!(
            SellerCode::from_record_key(String::new()),
            Err(StorageError::Corrupt(_))
        ));
    }
}
