use axum::{routing::post, Router};

pub mod history;
pub mod products;
pub mod sales;
pub mod sellers;
pub mod system;
pub mod verify;

/// Router for all ledger endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/sellers", sellers::router())
        .nest("/sales", sales::router())
        .route("/verify", post(verify::verify))
        .route("/history", post(history::purchase_history))
}
