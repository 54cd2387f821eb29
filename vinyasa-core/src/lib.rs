//! Core commerce logic for the vinyasa demo shop.
//!
//! This crate owns everything that has real state or failure semantics:
//! the ACP checkout state machine, the in-memory session store, and the
//! card-rail payment gateway abstraction. The HTTP surface and the x402
//! crypto rail live in sibling crates and consume these types.
//!
//! # Modules
//!
//! - [`catalog`] - Static product and gated-content catalogs
//! - [`checkout`] - Checkout sessions, session store, and the state machine
//! - [`error`] - Error taxonomy shared across operations
//! - [`gateway`] - Payment gateway capability and the Stripe implementation
//! - [`money`] - Cent-amount display formatting

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod gateway;
pub mod money;

pub use error::CommerceError;
