use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};

use crate::app::{dto, errors};
use crate::app::services::{self, AppServices};

pub async fn purchase_history(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::HistoryRequest>,
) -> axum::response::Response {
    let serials = match body.parse_serials() {
        Ok(s) => s,
        Err(e) => return errors::read_error(e),
    };

    match services::blocking(&services, move |s| s.engine().purchase_history(&serials)).await {
        Ok(history) => Json(history).into_response(),
        Err(e) => errors::read_error(e),
    }
}
