//! Error taxonomy for checkout operations.
//!
//! Every operation boundary returns one of these variants; nothing in this
//! crate terminates the process or panics on bad input. Each variant maps
//! to a distinct caller-facing status at the HTTP layer.

/// Errors returned by checkout and order operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommerceError {
    /// Unknown session, product, or order id.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The operation is not permitted in the session's current status.
    #[error("checkout session is not open")]
    InvalidState,

    /// The payment token was rejected before any gateway call was made.
    #[error("invalid payment token: {0}")]
    InvalidPayment(String),

    /// The payment gateway explicitly declined or failed the charge.
    #[error("payment failed: {0}")]
    PaymentFailed(String),

    /// Missing or malformed payment configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl CommerceError {
    /// Shorthand for an unknown-session error.
    #[must_use]
    pub const fn session_not_found() -> Self {
        Self::NotFound("checkout session")
    }

    /// Shorthand for an unknown-product error.
    #[must_use]
    pub const fn product_not_found() -> Self {
        Self::NotFound("product")
    }

    /// Shorthand for an unknown-order error.
    #[must_use]
    pub const fn order_not_found() -> Self {
        Self::NotFound("order")
    }
}
