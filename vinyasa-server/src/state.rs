//! Shared application state.
//!
//! Built once at startup and threaded into every handler. Collaborators
//! (payment gateway, facilitator) are injected as trait objects so tests
//! can substitute doubles without touching the router.

use std::sync::Arc;

use vinyasa_core::catalog::{ContentCatalog, ProductCatalog};
use vinyasa_core::checkout::{CheckoutPolicy, CheckoutService};
use vinyasa_core::error::CommerceError;
use vinyasa_core::gateway::{PaymentGateway, StripeGateway};
use vinyasa_x402::facilitator::{Facilitator, HttpFacilitator};
use vinyasa_x402::pipeline::X402Verifier;

use crate::config::Config;

/// Process-wide state handed to every route handler.
pub struct AppState {
    /// The ACP checkout state machine.
    pub checkout: CheckoutService,
    /// The x402 verification pipeline.
    pub verifier: X402Verifier,
    /// Product catalog.
    pub products: ProductCatalog,
    /// Gated-content catalog.
    pub classes: ContentCatalog,
    /// V1 network name used for x402 challenges.
    pub network: String,
    /// Recipient address for x402 payments.
    pub pay_to: String,
    /// Public base URL for resource links.
    pub base_url: String,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("network", &self.network)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Shared handle to [`AppState`].
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Builds production state from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::Config`] if an HTTP client cannot be
    /// constructed.
    pub fn from_config(config: &Config) -> Result<Self, CommerceError> {
        let gateway = Arc::new(StripeGateway::new(
            config.stripe_secret_key.clone(),
            config.payment_timeout,
        )?);
        let facilitator = Arc::new(
            HttpFacilitator::new(config.facilitator_url.clone(), config.payment_timeout)
                .map_err(|e| CommerceError::Config(e.to_string()))?,
        );
        Ok(Self::with_collaborators(config, gateway, facilitator))
    }

    /// Builds state around injected collaborators (used by tests).
    #[must_use]
    pub fn with_collaborators(
        config: &Config,
        gateway: Arc<dyn PaymentGateway>,
        facilitator: Arc<dyn Facilitator>,
    ) -> Self {
        let policy = CheckoutPolicy {
            mode: config.mode,
            allow_cancel_completed: config.allow_cancel_completed,
        };
        Self {
            checkout: CheckoutService::new(ProductCatalog::demo(), gateway, policy),
            verifier: X402Verifier::new(facilitator, config.demo_mode),
            products: ProductCatalog::demo(),
            classes: ContentCatalog::from_env(),
            network: config.network.clone(),
            pay_to: config.pay_to.clone(),
            base_url: config.base_url.clone(),
        }
    }
}
