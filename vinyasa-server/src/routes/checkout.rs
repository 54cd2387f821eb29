//! Hosted Stripe checkout route.
//!
//! The hosted rail is an alternative to ACP for human buyers: the server
//! creates a Stripe-hosted checkout page and hands back its URL, and the
//! hosted page owns the rest of the flow.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use vinyasa_core::checkout::HostedCheckoutView;

use crate::error::ApiError;
use crate::state::SharedState;

/// Body of `POST /checkout`.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Product to buy.
    pub product_id: String,
    /// Quantity, clamped to `[1, 999]`; defaults to 1.
    pub quantity: Option<u32>,
    /// Post-payment redirect; defaults to `{base_url}/success`.
    pub success_url: Option<String>,
    /// Abandonment redirect; defaults to `{base_url}/`.
    pub cancel_url: Option<String>,
}

/// `POST /checkout` — creates a hosted checkout page and returns its URL.
///
/// # Errors
///
/// Returns 404 for an unknown product id and 402 when the gateway cannot
/// create the session.
pub async fn create_checkout(
    State(state): State<SharedState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<HostedCheckoutView>, ApiError> {
    let success_url = body
        .success_url
        .unwrap_or_else(|| format!("{}/success", state.base_url));
    let cancel_url = body
        .cancel_url
        .unwrap_or_else(|| format!("{}/", state.base_url));
    let view = state
        .checkout
        .hosted_checkout(&body.product_id, body.quantity, &success_url, &cancel_url)
        .await?;
    Ok(Json(view))
}
