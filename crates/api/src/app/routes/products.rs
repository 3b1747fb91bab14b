use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use chainverify_core::{LedgerError, ManufacturerId, SerialNumber};
use chainverify_products::ProductLabel;

use crate::app::{dto, errors};
use crate::app::services::{self, AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(register_product))
        .route("/:serial", get(get_product))
        .route("/:serial/exists", get(product_exists))
}

pub async fn register_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterProductRequest>,
) -> axum::response::Response {
    let cmd = match body.into_command() {
        Ok(c) => c,
        Err(e) => return errors::write_error(e),
    };

    let product = match services::blocking(&services, move |s| s.register_product(cmd)).await {
        Ok(p) => p,
        Err(e) => return errors::write_error(e),
    };

    let label = match ProductLabel::for_product(&product).to_payload() {
        Ok(l) => l,
        Err(e) => {
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "label_error", e.to_string());
        }
    };

    (StatusCode::CREATED, Json(dto::RegisteredProductResponse { product, label })).into_response()
}

/// All serial numbers, or one manufacturer's, in registration order.
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListProductsQuery>,
) -> axum::response::Response {
    let manufacturer = match query.manufacturer_id.map(ManufacturerId::parse).transpose() {
        Ok(m) => m,
        Err(e) => return errors::read_error(e),
    };

    let listed = services::blocking(&services, move |s| match &manufacturer {
        Some(m) => s.products().list_by_manufacturer(m),
        None => s.products().list_all(),
    })
    .await;

    match listed {
        Ok(serials) => Json(serials).into_response(),
        Err(e) => errors::read_error(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(serial): Path<String>,
) -> axum::response::Response {
    let serial = match SerialNumber::parse(serial) {
        Ok(s) => s,
        Err(e) => return errors::read_error(e),
    };

    let key = serial.clone();
    match services::blocking(&services, move |s| s.products().get(&key)).await {
        Ok(Some(product)) => Json(product).into_response(),
        Ok(None) => errors::read_error(LedgerError::product_not_found(serial.into_inner())),
        Err(e) => errors::read_error(e),
    }
}

pub async fn product_exists(
    Extension(services): Extension<Arc<AppServices>>,
    Path(serial): Path<String>,
) -> axum::response::Response {
    let serial = match SerialNumber::parse(serial) {
        Ok(s) => s,
        Err(e) => return errors::read_error(e),
    };

    match services::blocking(&services, move |s| s.products().exists(&serial)).await {
        Ok(exists) => Json(dto::ExistsResponse { exists }).into_response(),
        Err(e) => errors::read_error(e),
    }
}
