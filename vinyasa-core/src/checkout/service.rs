//! The checkout state machine.
//!
//! Enforces the `create -> update* -> (complete | cancel)` transition
//! contract, computes totals, and orchestrates the payment gateway on
//! completion. All collaborators are injected at construction; the
//! service holds no ambient state beyond its own store.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::ProductCatalog;
use crate::error::CommerceError;
use crate::gateway::{GatewayError, HostedCheckoutParams, PaymentGateway, PaymentMode};
use crate::money::format_cents;

use super::session::{CheckoutSession, CheckoutStatus, LineItem, clamp_quantity};
use super::store::SessionStore;

/// All charges are denominated in US dollars.
const CURRENCY: &str = "usd";

/// Canned Stripe test instrument used for non-`pm_` tokens in test mode.
const TEST_INSTRUMENT: &str = "pm_card_visa";

/// Matches a real Stripe payment-method id (`pm_xxx`).
static PAYMENT_METHOD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^pm_[a-zA-Z0-9]+$").expect("valid payment method pattern"));

/// Returns `true` if `token` looks like a real payment-method id.
#[must_use]
pub fn is_payment_method_id(token: &str) -> bool {
    PAYMENT_METHOD_RE.is_match(token)
}

/// Policy knobs for the state machine.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutPolicy {
    /// Live vs. test settlement behavior.
    pub mode: PaymentMode,
    /// When set, `cancel` is allowed on non-open sessions, matching the
    /// permissive behavior of earlier revisions of this flow. Off by
    /// default: the safer contract rejects cancel once a session closed.
    pub allow_cancel_completed: bool,
}

impl CheckoutPolicy {
    /// Default policy for a mode: strict cancel semantics.
    #[must_use]
    pub const fn new(mode: PaymentMode) -> Self {
        Self {
            mode,
            allow_cancel_completed: false,
        }
    }
}

/// Caller-facing view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    /// Session id.
    pub checkout_session_id: String,
    /// Current status.
    pub status: CheckoutStatus,
    /// Line items (always exactly one).
    pub line_items: Vec<LineItem>,
    /// Shipping data, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<serde_json::Value>,
    /// Total in cents.
    pub total_cents: i64,
    /// Human-readable total.
    pub total_display: String,
    /// Actions currently valid for this session.
    pub available_actions: Vec<&'static str>,
}

impl SessionView {
    fn of(session: &CheckoutSession) -> Self {
        let available_actions = if session.is_open() {
            vec!["update", "complete", "cancel"]
        } else {
            Vec::new()
        };
        Self {
            checkout_session_id: session.id.clone(),
            status: session.status,
            line_items: session.line_items.clone(),
            shipping_address: session.shipping_address.clone(),
            total_cents: session.total_cents,
            total_display: format_cents(session.total_cents),
            available_actions,
        }
    }
}

/// Result of a successful completion.
#[derive(Debug, Clone, Serialize)]
pub struct CompleteView {
    /// Session id.
    pub checkout_session_id: String,
    /// Always `completed`.
    pub status: CheckoutStatus,
    /// Freshly assigned order id.
    pub order_id: String,
    /// Gateway-reported payment status.
    pub payment_status: String,
    /// Amount charged, in cents.
    pub total_charged_cents: i64,
    /// Human-readable total.
    pub total_display: String,
}

/// Read-only order projection, resolvable only while the underlying
/// session is completed.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    /// Order id.
    pub order_id: String,
    /// Originating session id.
    pub checkout_session_id: String,
    /// Session status (always `completed` when resolvable).
    pub status: CheckoutStatus,
    /// Line items at completion time.
    pub line_items: Vec<LineItem>,
    /// Total in cents.
    pub total_cents: i64,
    /// Human-readable total.
    pub total_display: String,
    /// Payment status.
    pub payment_status: String,
}

/// Result of opening a gateway-hosted checkout page.
#[derive(Debug, Clone, Serialize)]
pub struct HostedCheckoutView {
    /// URL the buyer is redirected to.
    pub url: String,
}

/// Patch applied by the update operation. Absent fields are untouched;
/// a present `shipping_address` replaces the stored one wholesale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRequest {
    /// New quantity for the sole line item, clamped to `[1, 999]`.
    pub quantity: Option<u32>,
    /// Replacement shipping data.
    pub shipping_address: Option<serde_json::Value>,
}

/// The ACP checkout state machine.
pub struct CheckoutService {
    catalog: ProductCatalog,
    store: SessionStore,
    gateway: Arc<dyn PaymentGateway>,
    policy: CheckoutPolicy,
}

impl std::fmt::Debug for CheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutService")
            .field("policy", &self.policy)
            .field("sessions", &self.store.len())
            .finish_non_exhaustive()
    }
}

impl CheckoutService {
    /// Creates a service over an empty session store.
    #[must_use]
    pub fn new(
        catalog: ProductCatalog,
        gateway: Arc<dyn PaymentGateway>,
        policy: CheckoutPolicy,
    ) -> Self {
        Self {
            catalog,
            store: SessionStore::new(),
            gateway,
            policy,
        }
    }

    /// Opens a new session for one product.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] if the product id is unknown.
    pub fn create(
        &self,
        product_id: &str,
        quantity: Option<u32>,
    ) -> Result<SessionView, CommerceError> {
        let product = self
            .catalog
            .get(product_id)
            .ok_or_else(CommerceError::product_not_found)?;
        let quantity = clamp_quantity(quantity);
        let session = CheckoutSession::new(product_id, quantity, product.price_cents);
        let view = SessionView::of(&session);
        tracing::info!(
            session_id = %session.id,
            product_id,
            quantity,
            total_cents = session.total_cents,
            "checkout session created"
        );
        self.store.insert(session);
        Ok(view)
    }

    /// Opens a gateway-hosted checkout page for one product.
    ///
    /// No session is created on this side: the hosted page owns the whole
    /// flow and the buyer never re-enters the ACP state machine.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] if the product id is unknown
    /// and [`CommerceError::PaymentFailed`] when the gateway rejects the
    /// session or the call fails.
    pub async fn hosted_checkout(
        &self,
        product_id: &str,
        quantity: Option<u32>,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<HostedCheckoutView, CommerceError> {
        let product = self
            .catalog
            .get(product_id)
            .ok_or_else(CommerceError::product_not_found)?;
        let quantity = clamp_quantity(quantity);

        let hosted = self
            .gateway
            .create_checkout_session(HostedCheckoutParams {
                product_name: product.name,
                unit_amount_cents: product.price_cents,
                currency: CURRENCY,
                quantity,
                success_url,
                cancel_url,
            })
            .await
            .map_err(|err| match err {
                GatewayError::Declined(message) => CommerceError::PaymentFailed(message),
                GatewayError::Transport(detail) => {
                    tracing::error!(product_id, detail, "hosted checkout transport failure");
                    CommerceError::PaymentFailed("payment gateway unavailable".to_owned())
                }
            })?;
        tracing::info!(product_id, quantity, "hosted checkout session created");
        Ok(HostedCheckoutView { url: hosted.url })
    }

    /// Applies a patch to an open session.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] for an unknown session and
    /// [`CommerceError::InvalidState`] once the session is no longer open.
    /// A rejected call leaves the session untouched.
    pub async fn update(
        &self,
        session_id: &str,
        patch: UpdateRequest,
    ) -> Result<SessionView, CommerceError> {
        let handle = self
            .store
            .get(session_id)
            .ok_or_else(CommerceError::session_not_found)?;
        let mut session = handle.lock().await;
        if !session.is_open() {
            return Err(CommerceError::InvalidState);
        }
        if let Some(quantity) = patch.quantity {
            session.set_quantity(quantity);
        }
        if let Some(address) = patch.shipping_address {
            session.shipping_address = Some(address);
        }
        tracing::debug!(session_id, total_cents = session.total_cents, "checkout session updated");
        Ok(SessionView::of(&session))
    }

    /// Charges the session total and closes the session as completed.
    ///
    /// The session lock is held across the gateway call, so completion is
    /// exactly-once: a concurrent or repeated `complete` observes the
    /// closed status and fails with [`CommerceError::InvalidState`].
    ///
    /// # Errors
    ///
    /// - [`CommerceError::NotFound`] / [`CommerceError::InvalidState`] as
    ///   for [`Self::update`].
    /// - [`CommerceError::InvalidPayment`] in live mode when the token is
    ///   not a real payment-method id; no gateway call is made.
    /// - [`CommerceError::PaymentFailed`] in live mode when the gateway
    ///   declines or the call fails.
    pub async fn complete(
        &self,
        session_id: &str,
        payment_token: &str,
    ) -> Result<CompleteView, CommerceError> {
        let handle = self
            .store
            .get(session_id)
            .ok_or_else(CommerceError::session_not_found)?;
        let mut session = handle.lock().await;
        if !session.is_open() {
            return Err(CommerceError::InvalidState);
        }

        let live = self.policy.mode.is_live();
        let is_real_instrument = is_payment_method_id(payment_token);
        if live && !is_real_instrument {
            // Real money: never fall back to a canned instrument.
            return Err(CommerceError::InvalidPayment(
                "live mode requires a payment_method id (pm_...) as payment_token".to_owned(),
            ));
        }
        let instrument = if is_real_instrument {
            payment_token
        } else {
            TEST_INSTRUMENT
        };

        match self
            .gateway
            .charge(session.total_cents, CURRENCY, instrument)
            .await
        {
            Ok(charge) => {
                let view = self.finalize(&mut session, Some(charge.id), charge.status);
                tracing::info!(
                    session_id,
                    order_id = %view.order_id,
                    amount_cents = view.total_charged_cents,
                    "checkout completed"
                );
                Ok(view)
            }
            Err(err) if live => {
                tracing::warn!(session_id, error = %err, "live charge failed");
                match err {
                    GatewayError::Declined(message) => Err(CommerceError::PaymentFailed(message)),
                    GatewayError::Transport(detail) => {
                        tracing::error!(session_id, detail, "gateway transport failure");
                        Err(CommerceError::PaymentFailed(
                            "payment gateway unavailable".to_owned(),
                        ))
                    }
                }
            }
            Err(err) => {
                // Test-only fallback: close the session without a charge so
                // demo flows keep moving. Must never be reachable in live
                // mode, where the arm above propagates the failure.
                tracing::warn!(
                    session_id,
                    error = %err,
                    "test-mode fallback: completing session without a charge"
                );
                let view = self.finalize(&mut session, None, "succeeded".to_owned());
                Ok(view)
            }
        }
    }

    /// Transitions a locked open session to completed and indexes the
    /// fresh order id.
    fn finalize(
        &self,
        session: &mut CheckoutSession,
        payment_intent: Option<String>,
        payment_status: String,
    ) -> CompleteView {
        let order_id = format!("order_{}", Uuid::new_v4().simple());
        session.status = CheckoutStatus::Completed;
        session.payment_intent = payment_intent;
        session.order_id = Some(order_id.clone());
        self.store.index_order(&order_id, &session.id);
        CompleteView {
            checkout_session_id: session.id.clone(),
            status: CheckoutStatus::Completed,
            order_id,
            payment_status,
            total_charged_cents: session.total_cents,
            total_display: format_cents(session.total_cents),
        }
    }

    /// Cancels a session.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] for an unknown session. Unless
    /// [`CheckoutPolicy::allow_cancel_completed`] is set, a non-open
    /// session fails with [`CommerceError::InvalidState`].
    pub async fn cancel(&self, session_id: &str) -> Result<SessionView, CommerceError> {
        let handle = self
            .store
            .get(session_id)
            .ok_or_else(CommerceError::session_not_found)?;
        let mut session = handle.lock().await;
        if !session.is_open() && !self.policy.allow_cancel_completed {
            return Err(CommerceError::InvalidState);
        }
        session.status = CheckoutStatus::Canceled;
        tracing::info!(session_id, "checkout session canceled");
        Ok(SessionView::of(&session))
    }

    /// Resolves an order id to its read-only projection.
    ///
    /// # Errors
    ///
    /// Returns [`CommerceError::NotFound`] when the order id is unknown or
    /// the underlying session is no longer completed (e.g., superseded by
    /// a permissive cancel).
    pub async fn get_order(&self, order_id: &str) -> Result<OrderView, CommerceError> {
        let handle = self
            .store
            .get_by_order(order_id)
            .ok_or_else(CommerceError::order_not_found)?;
        let session = handle.lock().await;
        if session.status != CheckoutStatus::Completed {
            return Err(CommerceError::order_not_found());
        }
        Ok(OrderView {
            order_id: order_id.to_owned(),
            checkout_session_id: session.id.clone(),
            status: session.status,
            line_items: session.line_items.clone(),
            total_cents: session.total_cents,
            total_display: format_cents(session.total_cents),
            payment_status: "succeeded".to_owned(),
        })
    }
}
