//! Checkout session data model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lowest quantity a line item can carry.
pub const MIN_QUANTITY: u32 = 1;
/// Highest quantity a line item can carry.
pub const MAX_QUANTITY: u32 = 999;

/// Clamps a caller-supplied quantity into `[1, 999]`.
///
/// Applied at every mutation entry point; a missing or zero quantity
/// defaults to 1.
#[must_use]
pub fn clamp_quantity(quantity: Option<u32>) -> u32 {
    quantity.unwrap_or(MIN_QUANTITY).clamp(MIN_QUANTITY, MAX_QUANTITY)
}

/// Lifecycle status of a checkout session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStatus {
    /// Accepting updates, completion, and cancellation.
    Open,
    /// Terminal: payment executed, order assigned.
    Completed,
    /// Terminal: abandoned.
    Canceled,
}

/// A single product line in a session. This system constrains every
/// session to exactly one line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Product catalog id.
    pub product_id: String,
    /// Quantity in `[1, 999]`.
    pub quantity: u32,
    /// Unit price in cents, captured at session creation.
    pub price_cents: i64,
}

/// A checkout session owned by the session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Opaque unique identifier, generated at creation.
    pub id: String,
    /// Current lifecycle status.
    pub status: CheckoutStatus,
    /// The single product line.
    pub line_items: Vec<LineItem>,
    /// Opaque shipping data, settable only while open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<serde_json::Value>,
    /// Always `price_cents * quantity` of the sole line item.
    pub total_cents: i64,
    /// Settlement reference, set only on a charged completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent: Option<String>,
    /// Set exactly once, when status becomes completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl CheckoutSession {
    /// Creates a new open session holding one line item.
    #[must_use]
    pub fn new(product_id: &str, quantity: u32, price_cents: i64) -> Self {
        let quantity = clamp_quantity(Some(quantity));
        Self {
            id: format!("acp_{}", Uuid::new_v4().simple()),
            status: CheckoutStatus::Open,
            line_items: vec![LineItem {
                product_id: product_id.to_owned(),
                quantity,
                price_cents,
            }],
            shipping_address: None,
            total_cents: price_cents * i64::from(quantity),
            payment_intent: None,
            order_id: None,
        }
    }

    /// Replaces the sole line item's quantity and recomputes the total.
    pub fn set_quantity(&mut self, quantity: u32) {
        let quantity = clamp_quantity(Some(quantity));
        if let Some(item) = self.line_items.first_mut() {
            item.quantity = quantity;
            self.total_cents = item.price_cents * i64::from(quantity);
        }
    }

    /// Returns `true` while the session accepts mutation.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == CheckoutStatus::Open
    }
}
