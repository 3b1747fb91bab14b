//! Ledger error model.

use thiserror::Error;

/// Result type used across the ledger.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Every variant except [`LedgerError::StorageUnavailable`] is a definitive business
/// outcome: retrying the same call can never change it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// A value failed validation (e.g. empty serial number).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A record with the same primary key is already registered.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// The referenced product has not been registered.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// The referenced seller has not been registered.
    #[error("seller not found: {0}")]
    SellerNotFound(String),

    /// A sale has already been recorded for the product.
    #[error("product already sold: {0}")]
    AlreadySold(String),

    /// The persistence backend could not complete the call.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn already_exists(key: impl Into<String>) -> Self {
        Self::AlreadyExists(key.into())
    }

    pub fn product_not_found(serial: impl Into<String>) -> Self {
        Self::ProductNotFound(serial.into())
    }

    pub fn seller_not_found(code: impl Into<String>) -> Self {
        Self::SellerNotFound(code.into())
    }

    pub fn already_sold(serial: impl Into<String>) -> Self {
        Self::AlreadySold(serial.into())
    }

    /// Only backend failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }

    /// Stable machine-readable code (used in API error bodies and log fields).
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::AlreadyExists(_) => "already_exists",
            Self::ProductNotFound(_) => "product_not_found",
            Self::SellerNotFound(_) => "seller_not_found",
            Self::AlreadySold(_) => "already_sold",
            Self::StorageUnavailable(_) => "storage_unavailable",
        }
    }
}

/// Failure reported by a [`RecordStore`](crate::RecordStore) backend.
///
/// These are infrastructure errors, as opposed to the business outcomes above.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend could not be reached or refused the operation.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl StorageError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }
}

impl From<StorageError> for LedgerError {
    fn from(value: StorageError) -> Self {
        LedgerError::StorageUnavailable(value.to_string())
    }
}
