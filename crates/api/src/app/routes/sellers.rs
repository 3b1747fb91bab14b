use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use chainverify_core::{LedgerError, SellerCode};

use crate::app::{dto, errors};
use crate::app::services::{self, AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", post(register_seller))
        .route("/:code", get(get_seller))
        .route("/:code/exists", get(seller_exists))
        .route("/:code/inventory", get(seller_inventory))
}

pub async fn register_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterSellerRequest>,
) -> axum::response::Response {
    let cmd = match body.into_command() {
        Ok(c) => c,
        Err(e) => return errors::write_error(e),
    };

    match services::blocking(&services, move |s| s.register_seller(cmd)).await {
        Ok(seller) => (StatusCode::CREATED, Json(seller)).into_response(),
        Err(e) => errors::write_error(e),
    }
}

pub async fn get_seller(
    Extension(services): Extension<Arc<AppServices>>,
    Path(code): Path<String>,
) -> axum::response::Response {
    let code = match SellerCode::parse(code) {
        Ok(c) => c,
        Err(e) => return errors::read_error(e),
    };

    let key = code.clone();
    match services::blocking(&services, move |s| s.sellers().get(&key)).await {
        Ok(Some(seller)) => Json(seller).into_response(),
        Ok(None) => errors::read_error(LedgerError::seller_not_found(code.into_inner())),
        Err(e) => errors::read_error(e),
    }
}

pub async fn seller_exists(
    Extension(services): Extension<Arc<AppServices>>,
    Path(code): Path<String>,
) -> axum::response::Response {
    let code = match SellerCode::parse(code) {
        Ok(c) => c,
        Err(e) => return errors::read_error(e),
    };

    match services::blocking(&services, move |s| s.sellers().exists(&code)).await {
        Ok(exists) => Json(dto::ExistsResponse { exists }).into_response(),
        Err(e) => errors::read_error(e),
    }
}

/// Products of the seller's manufacturer with their sale status.
pub async fn seller_inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Path(code): Path<String>,
) -> axum::response::Response {
    let code = match SellerCode::parse(code) {
        Ok(c) => c,
        Err(e) => return errors::read_error(e),
    };

    match services::blocking(&services, move |s| s.engine().seller_inventory(&code)).await {
        Ok(inventory) => Json(inventory).into_response(),
        Err(e) => errors::read_error(e),
    }
}
