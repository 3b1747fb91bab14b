use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use chainverify_core::SerialNumber;

use crate::app::{dto, errors};
use crate::app::services::{self, AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", post(record_sale))
        .route("/:serial", get(get_sale))
        .route("/:serial/exists", get(sale_exists))
}

pub async fn record_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RecordSaleRequest>,
) -> axum::response::Response {
    let cmd = match body.into_command() {
        Ok(c) => c,
        Err(e) => return errors::write_error(e),
    };

    match services::blocking(&services, move |s| s.record_sale(cmd)).await {
        Ok(sale) => (StatusCode::CREATED, Json(dto::SaleView::from(&sale))).into_response(),
        Err(e) => errors::write_error(e),
    }
}

pub async fn get_sale(
    Extension(services): Extension<Arc<AppServices>>,
    Path(serial): Path<String>,
) -> axum::response::Response {
    let serial = match SerialNumber::parse(serial) {
        Ok(s) => s,
        Err(e) => return errors::read_error(e),
    };

    match services::blocking(&services, move |s| s.sales().get_sale(&serial)).await {
        Ok(Some(sale)) => Json(dto::SaleView::from(&sale)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "sale_not_found", "no sale recorded for this product"),
        Err(e) => errors::read_error(e),
    }
}

pub async fn sale_exists(
    Extension(services): Extension<Arc<AppServices>>,
    Path(serial): Path<String>,
) -> axum::response::Response {
    let serial = match SerialNumber::parse(serial) {
        Ok(s) => s,
        Err(e) => return errors::read_error(e),
    };

    match services::blocking(&services, move |s| s.sales().sale_exists(&serial)).await {
        Ok(exists) => Json(dto::ExistsResponse { exists }).into_response(),
        Err(e) => errors::read_error(e),
    }
}
