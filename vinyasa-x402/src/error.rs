//! Error types for x402 payment verification.

/// Errors from requirement construction and the verification pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum X402Error {
    /// The price string could not be converted to atomic units.
    #[error("unsupported price: {0}")]
    UnsupportedPrice(String),

    /// Missing or malformed payment configuration (unknown network,
    /// invalid address, asset without signing-domain metadata).
    #[error("x402 configuration error: {0}")]
    Config(String),

    /// The submitted payment proof could not be decoded.
    #[error("invalid payment proof: {0}")]
    InvalidProof(String),

    /// The facilitator call failed or returned a malformed response.
    #[error("facilitator error: {0}")]
    Facilitator(String),
}
