use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};

use crate::app::{dto, errors};
use crate::app::services::{self, AppServices};

/// Authenticity check. Every verdict, including `not_found`, is a 200.
pub async fn verify(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::VerifyRequest>,
) -> axum::response::Response {
    let serial = match body.serial_number() {
        Ok(s) => s,
        Err(e) => return errors::read_error(e),
    };
    let buyer_code = body.buyer_code;

    match services::blocking(&services, move |s| s.engine().verify(&serial, &buyer_code)).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => errors::read_error(e),
    }
}
