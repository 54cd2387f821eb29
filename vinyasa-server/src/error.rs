//! HTTP error mapping.
//!
//! Each error kind maps to a distinct caller-facing status: not-found vs.
//! conflict vs. payment-declined vs. server-misconfigured. Configuration
//! detail is logged, never returned to the caller.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use vinyasa_core::CommerceError;
use vinyasa_x402::X402Error;

/// Route-level error wrapper.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Checkout/order operation failure.
    #[error("{0}")]
    Commerce(#[from] CommerceError),

    /// x402 requirement construction failure.
    #[error("{0}")]
    X402(#[from] X402Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Commerce(err) => match err {
                CommerceError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                CommerceError::InvalidState => (StatusCode::CONFLICT, err.to_string()),
                CommerceError::InvalidPayment(_) | CommerceError::PaymentFailed(_) => {
                    (StatusCode::PAYMENT_REQUIRED, err.to_string())
                }
                CommerceError::Config(detail) => {
                    tracing::error!(detail, "configuration error surfaced to a request");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "server payment configuration error".to_owned(),
                    )
                }
            },
            Self::X402(err) => match err {
                X402Error::InvalidProof(_) => (StatusCode::PAYMENT_REQUIRED, err.to_string()),
                X402Error::UnsupportedPrice(detail) | X402Error::Config(detail) => {
                    tracing::error!(detail, "x402 configuration error surfaced to a request");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "server payment configuration error".to_owned(),
                    )
                }
                X402Error::Facilitator(detail) => {
                    tracing::warn!(detail, "facilitator failure surfaced to a request");
                    (
                        StatusCode::BAD_GATEWAY,
                        "payment facilitator unavailable".to_owned(),
                    )
                }
            },
        };
        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(CommerceError::session_not_found().into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CommerceError::InvalidState.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(CommerceError::InvalidPayment("bad token".to_owned()).into()),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            status_of(CommerceError::PaymentFailed("declined".to_owned()).into()),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            status_of(CommerceError::Config("missing key".to_owned()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(X402Error::Config("no eip712".to_owned()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
