use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use chainverify_core::LedgerError;

/// Whether the failing call read or wrote.
///
/// A missing product or seller is a plain 404 on reads. On writes the request itself was
/// well-formed but refers to something that does not exist, which is a 422.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

pub fn ledger_error_to_response(err: LedgerError, access: Access) -> axum::response::Response {
    let status = match (&err, access) {
        (LedgerError::Validation(_), _) => StatusCode::BAD_REQUEST,
        (LedgerError::AlreadyExists(_) | LedgerError::AlreadySold(_), _) => StatusCode::CONFLICT,
        (LedgerError::ProductNotFound(_) | LedgerError::SellerNotFound(_), Access::Read) => StatusCode::NOT_FOUND,
        (LedgerError::ProductNotFound(_) | LedgerError::SellerNotFound(_), Access::Write) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        (LedgerError::StorageUnavailable(_), _) => StatusCode::SERVICE_UNAVAILABLE,
    };

    if err.is_retryable() {
        tracing::warn!(error = %err, "ledger storage unavailable");
    }

    error_body(status, err.code(), err.to_string(), err.is_retryable())
}

pub fn read_error(err: LedgerError) -> axum::response::Response {
    ledger_error_to_response(err, Access::Read)
}

pub fn write_error(err: LedgerError) -> axum::response::Response {
    ledger_error_to_response(err, Access::Write)
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    error_body(status, code, message.into(), false)
}

fn error_body(status: StatusCode, code: &'static str, message: String, retryable: bool) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message,
            "retryable": retryable,
        })),
    )
        .into_response()
}
