//! ACP checkout routes.
//!
//! Thin translation layer over [`CheckoutService`]: handlers deserialize
//! the request body, delegate, and map domain errors to status codes via
//! [`ApiError`]. No business rules live here.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use vinyasa_core::checkout::{CompleteView, OrderView, SessionView, UpdateRequest};

use crate::error::ApiError;
use crate::state::SharedState;

/// Body of `POST /acp/checkout_sessions`.
#[derive(Debug, Deserialize)]
pub struct CreateRequest {
    /// Product to open the session for.
    pub product_id: String,
    /// Initial quantity, clamped to `[1, 999]`; defaults to 1.
    pub quantity: Option<u32>,
}

/// Body of `POST /acp/checkout_sessions/{id}/complete`.
#[derive(Debug, Deserialize)]
pub struct CompleteRequest {
    /// Payment token: a `pm_...` payment-method id, or any placeholder in
    /// test mode.
    pub payment_token: String,
}

/// `POST /acp/checkout_sessions` — opens a session.
///
/// # Errors
///
/// Returns 404 for an unknown product id.
pub async fn create_session(
    State(state): State<SharedState>,
    Json(body): Json<CreateRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state.checkout.create(&body.product_id, body.quantity)?;
    Ok(Json(view))
}

/// `POST /acp/checkout_sessions/{id}` — patches an open session.
///
/// # Errors
///
/// Returns 404 for an unknown session and 409 once it is closed.
pub async fn update_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(patch): Json<UpdateRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state.checkout.update(&id, patch).await?;
    Ok(Json(view))
}

/// `POST /acp/checkout_sessions/{id}/complete` — charges and closes.
///
/// # Errors
///
/// Returns 404 / 409 as for update, and 402 when the payment token is
/// rejected or the charge fails in live mode.
pub async fn complete_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(body): Json<CompleteRequest>,
) -> Result<Json<CompleteView>, ApiError> {
    let view = state.checkout.complete(&id, &body.payment_token).await?;
    Ok(Json(view))
}

/// `POST /acp/checkout_sessions/{id}/cancel` — cancels an open session.
///
/// # Errors
///
/// Returns 404 for an unknown session and 409 once it is closed.
pub async fn cancel_session(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let view = state.checkout.cancel(&id).await?;
    Ok(Json(view))
}

/// `GET /acp/orders/{id}` — read-only order projection.
///
/// # Errors
///
/// Returns 404 when the order id is unknown.
pub async fn get_order(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<OrderView>, ApiError> {
    let view = state.checkout.get_order(&id).await?;
    Ok(Json(view))
}
