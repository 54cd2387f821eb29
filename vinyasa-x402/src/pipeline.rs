//! The two-phase verify+settle pipeline.
//!
//! Each stage short-circuits to an invalid outcome; there is no partial
//! success and no retry. A failed stage means the client must start a
//! fresh 402 challenge cycle.

use std::sync::Arc;

use crate::error::X402Error;
use crate::facilitator::Facilitator;
use crate::proto::decode_payment;
use crate::requirements::{RequirementsInput, build_payment_requirements, find_matching_requirement};

/// Reserved sentinel proof accepted when the demo bypass is enabled.
pub const DEMO_PROOF: &str = "demo";

/// Placeholder settlement reference returned by the demo bypass.
pub const DEMO_TRANSACTION: &str = "demo-mode-tx";

/// Per-request context: the tuple the original 402 challenge was issued
/// with, so verification can rebuild the identical requirement set.
#[derive(Debug, Clone)]
pub struct VerifyContext {
    /// URL of the gated resource.
    pub resource: String,
    /// Human price string the challenge advertised.
    pub price: String,
    /// V1 network name.
    pub network: String,
    /// Human-readable description.
    pub description: String,
}

/// Outcome of a verification attempt.
#[derive(Debug, Clone)]
pub struct VerifyOutcome {
    /// Whether the proof was verified and settled.
    pub valid: bool,
    /// On-chain transaction reference when settled.
    pub tx_hash: Option<String>,
}

impl VerifyOutcome {
    const fn invalid() -> Self {
        Self {
            valid: false,
            tx_hash: None,
        }
    }

    const fn settled(tx_hash: Option<String>) -> Self {
        Self {
            valid: true,
            tx_hash,
        }
    }
}

/// Stateless verification pipeline over an injected facilitator.
pub struct X402Verifier {
    facilitator: Arc<dyn Facilitator>,
    demo_bypass: bool,
}

impl std::fmt::Debug for X402Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("X402Verifier")
            .field("demo_bypass", &self.demo_bypass)
            .finish_non_exhaustive()
    }
}

impl X402Verifier {
    /// Creates a verifier.
    ///
    /// `demo_bypass` must stay off whenever real settlement is required;
    /// it exists solely for protocol demonstrations without funded
    /// wallets.
    #[must_use]
    pub fn new(facilitator: Arc<dyn Facilitator>, demo_bypass: bool) -> Self {
        Self {
            facilitator,
            demo_bypass,
        }
    }

    /// Validates a payment proof against the challenge it answers, then
    /// settles it. Any stage failure yields an invalid outcome; only a
    /// successful settlement yields a transaction reference.
    pub async fn verify_payment(
        &self,
        proof: &str,
        pay_to: &str,
        ctx: &VerifyContext,
    ) -> VerifyOutcome {
        if self.demo_bypass && proof == DEMO_PROOF {
            tracing::info!(resource = %ctx.resource, "demo bypass accepted sentinel proof");
            return VerifyOutcome::settled(Some(DEMO_TRANSACTION.to_owned()));
        }

        // Stage 1: decode.
        let payload = match decode_payment(proof) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::debug!(error = %err, "payment proof rejected at decode");
                return VerifyOutcome::invalid();
            }
        };

        // Stage 2: rebuild the canonical requirement set.
        let input = RequirementsInput {
            price: &ctx.price,
            network: &ctx.network,
            pay_to,
            resource: &ctx.resource,
            description: &ctx.description,
            method: "GET",
        };
        let requirements = match build_payment_requirements(&input) {
            Ok(requirements) => requirements,
            Err(err) => {
                tracing::warn!(error = %err, "could not rebuild payment requirements");
                return VerifyOutcome::invalid();
            }
        };

        // Stage 3: match the proof to a requirement.
        let Some(selected) = find_matching_requirement(&requirements, &payload) else {
            tracing::debug!(
                scheme = %payload.scheme,
                network = %payload.network,
                "proof matches no advertised requirement"
            );
            return VerifyOutcome::invalid();
        };

        // Stage 4: facilitator verification.
        match self.facilitator.verify(&payload, selected).await {
            Ok(response) if response.is_valid => {}
            Ok(response) => {
                tracing::debug!(
                    reason = response.invalid_reason.as_deref().unwrap_or("unspecified"),
                    "facilitator rejected proof"
                );
                return VerifyOutcome::invalid();
            }
            Err(err) => {
                tracing::warn!(error = %err, "facilitator verify call failed");
                return VerifyOutcome::invalid();
            }
        }

        // Stage 5: settlement.
        match self.facilitator.settle(&payload, selected).await {
            Ok(response) if response.success => {
                tracing::info!(
                    transaction = response.transaction.as_deref().unwrap_or(""),
                    network = %ctx.network,
                    "payment settled"
                );
                VerifyOutcome::settled(response.transaction)
            }
            Ok(response) => {
                tracing::warn!(
                    reason = response.error_reason.as_deref().unwrap_or("unspecified"),
                    "settlement failed"
                );
                VerifyOutcome::invalid()
            }
            Err(err) => {
                tracing::warn!(error = %err, "facilitator settle call failed");
                VerifyOutcome::invalid()
            }
        }
    }
}
