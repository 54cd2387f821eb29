//! x402 payment verification for the vinyasa demo shop.
//!
//! Implements the resource-server side of the x402 protocol (V1 wire
//! format): building payment requirements for HTTP 402 challenges,
//! decoding client-submitted payment proofs, matching proofs against
//! requirements, and two-phase verify+settle against a remote
//! facilitator service.
//!
//! The pipeline is stateless per call — all context (price, network,
//! recipient, resource) is passed in per invocation, and no stage
//! retries: a failed request is terminal and the client is expected to
//! start a fresh 402 challenge cycle.
//!
//! # Modules
//!
//! - [`error`] - Error taxonomy
//! - [`facilitator`] - Remote facilitator capability and HTTP client
//! - [`networks`] - Known networks and their USDC deployments
//! - [`pipeline`] - The verify+settle pipeline
//! - [`price`] - Human price string to atomic-unit conversion
//! - [`proto`] - V1 wire format types and proof encoding
//! - [`requirements`] - Payment requirements builder and matching

pub mod error;
pub mod facilitator;
pub mod networks;
pub mod pipeline;
pub mod price;
pub mod proto;
pub mod requirements;

pub use error::X402Error;
pub use facilitator::{Facilitator, HttpFacilitator};
pub use pipeline::{VerifyContext, VerifyOutcome, X402Verifier};
pub use proto::{PaymentPayload, PaymentRequired, PaymentRequirements};
pub use requirements::{RequirementsInput, build_payment_requirements};
