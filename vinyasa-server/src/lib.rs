//! HTTP surface for the vinyasa demo shop.
//!
//! Thin glue: every route translates a request into a call on the
//! checkout state machine or the x402 verification pipeline and
//! serializes the result. Business rules live in `vinyasa-core` and
//! `vinyasa-x402`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::router;
pub use state::{AppState, SharedState};
