//! x402-gated content routes.
//!
//! Listing classes is free; fetching the full content of one requires a
//! payment proof in the `X-PAYMENT` header. Requests without a proof
//! (or with one that fails the pipeline) receive a structured 402
//! challenge — never partial content.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use vinyasa_core::CommerceError;
use vinyasa_x402::pipeline::VerifyContext;
use vinyasa_x402::proto::{PaymentRequired, X402_VERSION};
use vinyasa_x402::requirements::{RequirementsInput, build_payment_requirements};

use crate::error::ApiError;
use crate::state::SharedState;

/// Request header carrying the base64 payment proof.
pub const PAYMENT_HEADER: &str = "X-PAYMENT";

/// Free listing entry: everything except the paywalled URL.
#[derive(Debug, Serialize)]
pub struct ClassSummary {
    /// Class id.
    pub id: &'static str,
    /// Class title.
    pub title: &'static str,
    /// Human-readable price.
    pub price: &'static str,
    /// Price in whole USDC.
    pub price_usdc: u64,
    /// Freely viewable preview.
    pub preview_url: String,
}

/// Released content after a settled payment.
#[derive(Debug, Serialize)]
pub struct ClassAccess {
    /// Class id.
    pub id: &'static str,
    /// Class title.
    pub title: &'static str,
    /// Full-content URL.
    pub full_url: String,
    /// Settlement reference, when the payment was settled on-chain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

/// `GET /classes` — free listing with preview URLs only.
pub async fn list_classes(State(state): State<SharedState>) -> Json<Vec<ClassSummary>> {
    let classes = state
        .classes
        .all()
        .iter()
        .map(|c| ClassSummary {
            id: c.id,
            title: c.title,
            price: c.price,
            price_usdc: c.price_usdc,
            preview_url: c.preview_url.clone(),
        })
        .collect();
    Json(classes)
}

/// `GET /classes/{id}` — the paywalled full content.
///
/// # Errors
///
/// Returns 404 for an unknown class and 500 when the challenge cannot
/// be constructed from the server's payment configuration.
pub async fn get_class(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let class = state
        .classes
        .get(&id)
        .ok_or(CommerceError::NotFound("class"))?
        .clone();
    let resource = format!("{}/classes/{}", state.base_url, class.id);

    let requirements = build_payment_requirements(&RequirementsInput {
        price: class.price,
        network: &state.network,
        pay_to: &state.pay_to,
        resource: &resource,
        description: class.title,
        method: "GET",
    })?;

    let Some(proof) = headers.get(PAYMENT_HEADER).and_then(|v| v.to_str().ok()) else {
        return Ok(challenge(requirements, "X-PAYMENT header is required"));
    };

    let ctx = VerifyContext {
        resource,
        price: class.price.to_owned(),
        network: state.network.clone(),
        description: class.title.to_owned(),
    };
    let outcome = state
        .verifier
        .verify_payment(proof, &state.pay_to, &ctx)
        .await;
    if !outcome.valid {
        return Ok(challenge(requirements, "invalid or unverifiable payment"));
    }

    Ok(Json(ClassAccess {
        id: class.id,
        title: class.title,
        full_url: class.full_url.clone(),
        tx_hash: outcome.tx_hash,
    })
    .into_response())
}

/// Builds a structured 402 challenge response.
fn challenge(
    accepts: Vec<vinyasa_x402::proto::PaymentRequirements>,
    error: &str,
) -> Response {
    let body = PaymentRequired {
        x402_version: X402_VERSION,
        error: Some(error.to_owned()),
        accepts,
    };
    (StatusCode::PAYMENT_REQUIRED, Json(body)).into_response()
}
