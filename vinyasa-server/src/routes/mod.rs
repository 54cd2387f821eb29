//! Route assembly.

use axum::http::Method;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::SharedState;

pub mod acp;
pub mod checkout;
pub mod content;
pub mod products;

/// Builds the full application router.
///
/// Endpoints:
/// - `GET /health`
/// - `GET /products`, `GET /products/{id}`
/// - `GET /classes`, `GET /classes/{id}` (x402-gated)
/// - `POST /checkout` (hosted Stripe checkout)
/// - `POST /acp/checkout_sessions` and the update/complete/cancel
///   session routes, `GET /acp/orders/{id}`
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/products", get(products::list_products))
        .route("/products/{id}", get(products::get_product))
        .route("/classes", get(content::list_classes))
        .route("/classes/{id}", get(content::get_class))
        .route("/checkout", post(checkout::create_checkout))
        .route("/acp/checkout_sessions", post(acp::create_session))
        .route("/acp/checkout_sessions/{id}", post(acp::update_session))
        .route(
            "/acp/checkout_sessions/{id}/complete",
            post(acp::complete_session),
        )
        .route(
            "/acp/checkout_sessions/{id}/cancel",
            post(acp::cancel_session),
        )
        .route("/acp/orders/{id}", get(acp::get_order))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(cors::Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(cors::Any),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
