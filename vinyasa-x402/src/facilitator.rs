//! Remote facilitator capability.
//!
//! The facilitator is the external service that checks a payment proof
//! (signature validity, balance, nonce freshness) and broadcasts the
//! settlement on-chain. The pipeline only sees the [`Facilitator`] trait;
//! [`HttpFacilitator`] is the production implementation and tests supply
//! their own doubles.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::X402Error;
use crate::proto::{PaymentPayload, PaymentRequirements, SettleResponse, VerifyResponse, X402_VERSION};

/// Public facilitator operated by the x402 project.
pub const DEFAULT_FACILITATOR_URL: &str = "https://x402.org/facilitator";

/// Default timeout for facilitator HTTP calls. A hung facilitator must
/// fail the request, not block it indefinitely.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Verification and settlement against an external facilitator.
#[async_trait]
pub trait Facilitator: Send + Sync {
    /// Checks that the payment proof is valid and settleable.
    ///
    /// # Errors
    ///
    /// Returns [`X402Error::Facilitator`] on transport failure or a
    /// malformed response.
    async fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse, X402Error>;

    /// Broadcasts the settlement on-chain.
    ///
    /// # Errors
    ///
    /// Returns [`X402Error::Facilitator`] on transport failure or a
    /// malformed response.
    async fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<SettleResponse, X402Error>;
}

/// Wire format for verify/settle request bodies.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct FacilitatorRequestBody<'a> {
    x402_version: u8,
    payment_payload: &'a PaymentPayload,
    payment_requirements: &'a PaymentRequirements,
}

/// HTTP facilitator client.
pub struct HttpFacilitator {
    url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpFacilitator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFacilitator")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

impl HttpFacilitator {
    /// Creates a client for the facilitator at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`X402Error::Config`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, X402Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| X402Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            url: url.into().trim_end_matches('/').to_owned(),
            client,
        })
    }

    /// Returns the facilitator base URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<T, X402Error> {
        let body = FacilitatorRequestBody {
            x402_version: X402_VERSION,
            payment_payload: payload,
            payment_requirements: requirements,
        };

        let response = self
            .client
            .post(format!("{}/{endpoint}", self.url))
            .json(&body)
            .send()
            .await
            .map_err(|e| X402Error::Facilitator(format!("{endpoint} request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(X402Error::Facilitator(format!(
                "{endpoint} failed ({status}): {text}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| X402Error::Facilitator(format!("{endpoint} response parse error: {e}")))
    }
}

#[async_trait]
impl Facilitator for HttpFacilitator {
    async fn verify(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<VerifyResponse, X402Error> {
        self.post("verify", payload, requirements).await
    }

    async fn settle(
        &self,
        payload: &PaymentPayload,
        requirements: &PaymentRequirements,
    ) -> Result<SettleResponse, X402Error> {
        self.post("settle", payload, requirements).await
    }
}
