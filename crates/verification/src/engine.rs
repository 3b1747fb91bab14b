use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use chainverify_core::{LedgerResult, SerialNumber};
use chainverify_products::{Product, ProductStore};
use chainverify_sales::{SaleLedger, SellerRef};
use chainverify_sellers::SellerStore;

/// Seller shown next to a verified sale.
///
/// `name` is `None` when the reference is an external account, when the seller code is
/// unknown, or when the lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerDisplay {
    pub reference: String,
    pub name: Option<String>,
}

/// Outcome of an authenticity check.
///
/// `Mismatch` carries no sale data: a caller holding the wrong buyer code
/// learns nothing about the recorded sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum VerificationResult {
    /// No product with this serial number is on record.
    NotFound,
    /// Registered but not sold yet.
    Unsold { product: Product },
    /// Sold, and the buyer code matches.
    Genuine {
        product: Product,
        sold_at: DateTime<Utc>,
        seller: SellerDisplay,
    },
    /// Sold, but to a different buyer code.
    Mismatch { product: Product },
}

/// Field-less form of [`VerificationResult`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    NotFound,
    Unsold,
    Genuine,
    Mismatch,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::NotFound => "not_found",
            Verdict::Unsold => "unsold",
            Verdict::Genuine => "genuine",
            Verdict::Mismatch => "mismatch",
        }
    }
}

impl VerificationResult {
    pub fn verdict(&self) -> Verdict {
        match self {
            VerificationResult::NotFound => Verdict::NotFound,
            VerificationResult::Unsold { .. } => Verdict::Unsold,
            VerificationResult::Genuine { .. } => Verdict::Genuine,
            VerificationResult::Mismatch { .. } => Verdict::Mismatch,
        }
    }

    pub fn is_genuine(&self) -> bool {
        self.verdict() == Verdict::Genuine
    }

    pub fn product(&self) -> Option<&Product> {
        match self {
            VerificationResult::NotFound => None,
            VerificationResult::Unsold { product }
            | VerificationResult::Genuine { product, .. }
            | VerificationResult::Mismatch { product } => Some(product),
        }
    }
}

/// Answers "is this product genuine and sold to this buyer".
///
/// Product lifecycle as seen by the engine:
///
/// ```text
/// Unregistered --register--> Registered --record_sale--> Sold
/// ```
///
/// `verify` projects that state plus a buyer-code comparison; it never writes.
pub struct VerificationEngine {
    pub(crate) products: Arc<ProductStore>,
    pub(crate) sellers: Arc<SellerStore>,
    pub(crate) sales: Arc<SaleLedger>,
}

impl VerificationEngine {
    pub fn new(products: Arc<ProductStore>, sellers: Arc<SellerStore>, sales: Arc<SaleLedger>) -> Self {
        Self {
            products,
            sellers,
            sales,
        }
    }

    pub fn verify(&self, serial: &SerialNumber, buyer_code: &str) -> LedgerResult<VerificationResult> {
        let Some(product) = self.products.get(serial)? else {
            debug!(serial_number = %serial, "verify: not found");
            return Ok(VerificationResult::NotFound);
        };

        let Some(sale) = self.sales.get_sale(serial)? else {
            debug!(serial_number = %serial, "verify: unsold");
            return Ok(VerificationResult::Unsold { product });
        };

        if !sale.buyer_code_matches(buyer_code) {
            debug!(serial_number = %serial, "verify: buyer code mismatch");
            return Ok(VerificationResult::Mismatch { product });
        }

        debug!(serial_number = %serial, "verify: genuine");
        Ok(VerificationResult::Genuine {
            product,
            sold_at: sale.sold_at(),
            seller: self.display_seller(sale.seller_ref()),
        })
    }

    /// Best-effort: never turns a lookup failure into a verification failure.
    pub(crate) fn display_seller(&self, seller_ref: &SellerRef) -> SellerDisplay {
        let name = match seller_ref {
            SellerRef::Code(code) => match self.sellers.get(code) {
                Ok(seller) => seller.map(|s| s.name().to_string()),
                Err(e) => {
                    warn!(seller_code = %code, error = %e, "seller name lookup failed");
                    None
                }
            },
            SellerRef::Account(_) => None,
        };

        SellerDisplay {
            reference: seller_ref.to_string(),
            name,
        }
    }
}
