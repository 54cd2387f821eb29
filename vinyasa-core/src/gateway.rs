//! Payment gateway capability for the card rail.
//!
//! The checkout state machine only sees the [`PaymentGateway`] trait; the
//! concrete [`StripeGateway`] talks to the Stripe REST API over HTTP. Tests
//! substitute their own implementations.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::CommerceError;

/// Whether charges move real money.
///
/// Derived from the Stripe secret key prefix: `sk_live_` is live,
/// `sk_test_` is test. Anything else is a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMode {
    /// Real settlement; token policy is strict and failures propagate.
    Live,
    /// Demo/test settlement; tokens are mapped to a canned test instrument
    /// and gateway failures fall back to an uncharged completion.
    Test,
}

impl PaymentMode {
    /// Derives the mode from a Stripe secret key.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Config`] if the key has neither a
    /// `sk_live_` nor a `sk_test_` prefix.
    pub fn from_secret_key(key: &str) -> Result<Self, CommerceError> {
        if key.starts_with("sk_live_") {
            Ok(Self::Live)
        } else if key.starts_with("sk_test_") {
            Ok(Self::Test)
        } else {
            Err(CommerceError::Config(
                "STRIPE_SECRET_KEY must start with sk_test_ or sk_live_".to_owned(),
            ))
        }
    }

    /// Returns `true` for [`PaymentMode::Live`].
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Live)
    }
}

/// A successfully executed charge.
#[derive(Debug, Clone)]
pub struct Charge {
    /// Settlement reference (payment-intent id).
    pub id: String,
    /// Gateway-reported payment status (e.g., "succeeded").
    pub status: String,
}

/// Errors from the payment gateway.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// The gateway processed the request and declined the charge.
    #[error("{0}")]
    Declined(String),

    /// The request never completed: network failure, timeout, or an
    /// unparseable response.
    #[error("payment gateway request failed: {0}")]
    Transport(String),
}

/// Inputs for a hosted checkout session.
#[derive(Debug, Clone, Copy)]
pub struct HostedCheckoutParams<'a> {
    /// Display name shown on the hosted page.
    pub product_name: &'a str,
    /// Unit price in cents.
    pub unit_amount_cents: i64,
    /// Charge currency.
    pub currency: &'a str,
    /// Quantity in `[1, 999]`.
    pub quantity: u32,
    /// Where the hosted page redirects after payment.
    pub success_url: &'a str,
    /// Where the hosted page redirects on abandonment.
    pub cancel_url: &'a str,
}

/// A hosted checkout page created by the gateway.
#[derive(Debug, Clone)]
pub struct HostedCheckout {
    /// URL the buyer is redirected to.
    pub url: String,
}

/// Capability to charge a payment instrument or hand the buyer off to a
/// gateway-hosted checkout page.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Charges `amount_cents` in `currency` against `instrument`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Declined`] when the gateway rejects the
    /// charge and [`GatewayError::Transport`] when the call itself fails.
    async fn charge(
        &self,
        amount_cents: i64,
        currency: &str,
        instrument: &str,
    ) -> Result<Charge, GatewayError>;

    /// Creates a hosted checkout session and returns its URL.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Declined`] when the gateway rejects the
    /// session and [`GatewayError::Transport`] when the call itself fails
    /// or no URL comes back.
    async fn create_checkout_session(
        &self,
        params: HostedCheckoutParams<'_>,
    ) -> Result<HostedCheckout, GatewayError>;
}

const STRIPE_API_URL: &str = "https://api.stripe.com";

/// Shape of a successful payment-intent response. Fields the checkout
/// flow does not branch on are left undeserialized.
#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    id: String,
    #[serde(default)]
    status: Option<String>,
}

/// Shape of a hosted checkout session response. Stripe can omit the URL
/// for non-hosted session types; this flow requires one.
#[derive(Debug, Deserialize)]
struct CheckoutSessionResponse {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// [`PaymentGateway`] backed by the Stripe payment-intents API.
///
/// Creates confirmed payment intents in a single call, with redirects
/// disabled so agent callers never receive an interactive next-action.
pub struct StripeGateway {
    base_url: String,
    secret_key: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for StripeGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeGateway")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl StripeGateway {
    /// Creates a gateway that talks to the public Stripe API.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Config`] if the HTTP client cannot be built.
    pub fn new(secret_key: impl Into<String>, timeout: Duration) -> Result<Self, CommerceError> {
        Self::with_base_url(STRIPE_API_URL, secret_key, timeout)
    }

    /// Creates a gateway against an alternate base URL (used by tests).
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Config`] if the HTTP client cannot be built.
    pub fn with_base_url(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CommerceError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CommerceError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            secret_key: secret_key.into(),
            client,
        })
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn charge(
        &self,
        amount_cents: i64,
        currency: &str,
        instrument: &str,
    ) -> Result<Charge, GatewayError> {
        let params = [
            ("amount", amount_cents.to_string()),
            ("currency", currency.to_owned()),
            ("confirm", "true".to_owned()),
            ("payment_method", instrument.to_owned()),
            ("automatic_payment_methods[enabled]", "true".to_owned()),
            (
                "automatic_payment_methods[allow_redirects]",
                "never".to_owned(),
            ),
        ];

        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let intent: PaymentIntentResponse = response
                .json()
                .await
                .map_err(|e| GatewayError::Transport(format!("response parse error: {e}")))?;
            Ok(Charge {
                id: intent.id,
                status: intent.status.unwrap_or_else(|| "succeeded".to_owned()),
            })
        } else {
            Err(GatewayError::Declined(decline_message(response).await))
        }
    }

    async fn create_checkout_session(
        &self,
        params: HostedCheckoutParams<'_>,
    ) -> Result<HostedCheckout, GatewayError> {
        let form = [
            ("mode", "payment".to_owned()),
            (
                "line_items[0][price_data][currency]",
                params.currency.to_owned(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                params.unit_amount_cents.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]",
                params.product_name.to_owned(),
            ),
            ("line_items[0][quantity]", params.quantity.to_string()),
            ("success_url", params.success_url.to_owned()),
            ("cancel_url", params.cancel_url.to_owned()),
        ];

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Declined(decline_message(response).await));
        }

        let session: CheckoutSessionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Transport(format!("response parse error: {e}")))?;
        let url = session.url.ok_or_else(|| {
            GatewayError::Transport("gateway returned no checkout URL".to_owned())
        })?;
        Ok(HostedCheckout { url })
    }
}

/// Extracts Stripe's human-readable error message from a failed response.
async fn decline_message(response: reqwest::Response) -> String {
    let status = response.status();
    response
        .json::<StripeErrorResponse>()
        .await
        .ok()
        .and_then(|e| e.error.message)
        .unwrap_or_else(|| format!("charge rejected with status {status}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_payment_mode_from_key() {
        assert_eq!(
            PaymentMode::from_secret_key("sk_live_abc").unwrap(),
            PaymentMode::Live
        );
        assert_eq!(
            PaymentMode::from_secret_key("sk_test_abc").unwrap(),
            PaymentMode::Test
        );
        assert!(matches!(
            PaymentMode::from_secret_key("pk_test_abc"),
            Err(CommerceError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_charge_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .and(body_string_contains("amount=5998"))
            .and(body_string_contains("payment_method=pm_card_visa"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "pi_123",
                "status": "succeeded",
            })))
            .mount(&server)
            .await;

        let gateway =
            StripeGateway::with_base_url(server.uri(), "sk_test_x", Duration::from_secs(5))
                .unwrap();
        let charge = gateway.charge(5998, "usd", "pm_card_visa").await.unwrap();
        assert_eq!(charge.id, "pi_123");
        assert_eq!(charge.status, "succeeded");
    }

    fn hosted_params() -> HostedCheckoutParams<'static> {
        HostedCheckoutParams {
            product_name: "Yoga Mat",
            unit_amount_cents: 2999,
            currency: "usd",
            quantity: 2,
            success_url: "https://shop.example/success",
            cancel_url: "https://shop.example/",
        }
    }

    #[tokio::test]
    async fn test_create_checkout_session_returns_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(body_string_contains("mode=payment"))
            .and(body_string_contains("unit_amount%5D=2999"))
            .and(body_string_contains("quantity%5D=2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_123",
                "url": "https://checkout.stripe.com/c/pay/cs_123",
            })))
            .mount(&server)
            .await;

        let gateway =
            StripeGateway::with_base_url(server.uri(), "sk_test_x", Duration::from_secs(5))
                .unwrap();
        let hosted = gateway.create_checkout_session(hosted_params()).await.unwrap();
        assert_eq!(hosted.url, "https://checkout.stripe.com/c/pay/cs_123");
    }

    #[tokio::test]
    async fn test_create_checkout_session_requires_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "cs_123",
            })))
            .mount(&server)
            .await;

        let gateway =
            StripeGateway::with_base_url(server.uri(), "sk_test_x", Duration::from_secs(5))
                .unwrap();
        let err = gateway
            .create_checkout_session(hosted_params())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transport(ref m) if m.contains("no checkout URL")));
    }

    #[tokio::test]
    async fn test_charge_declined_maps_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/payment_intents"))
            .respond_with(ResponseTemplate::new(402).set_body_json(serde_json::json!({
                "error": { "message": "Your card was declined." },
            })))
            .mount(&server)
            .await;

        let gateway =
            StripeGateway::with_base_url(server.uri(), "sk_test_x", Duration::from_secs(5))
                .unwrap();
        let err = gateway
            .charge(100, "usd", "pm_card_visa")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Declined(ref m) if m == "Your card was declined."));
    }
}
