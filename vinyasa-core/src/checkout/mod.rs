//! ACP checkout: session data model, store, and state machine.
//!
//! A checkout session moves through a strict one-way lattice:
//! `open -> completed` or `open -> canceled`, both terminal. The
//! [`service::CheckoutService`] enforces the transition contract and
//! orchestrates the payment gateway; [`store::SessionStore`] owns the
//! records and serializes mutation per session.

pub mod service;
pub mod session;
pub mod store;

pub use service::{
    CheckoutPolicy, CheckoutService, CompleteView, HostedCheckoutView, OrderView, SessionView,
    UpdateRequest,
};
pub use session::{CheckoutSession, CheckoutStatus, LineItem, clamp_quantity};
pub use store::SessionStore;
