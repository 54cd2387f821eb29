//! Demo commerce server: ACP checkout over Stripe plus x402-gated content.
//!
//! # Usage
//!
//! ```bash
//! STRIPE_SECRET_KEY=sk_test_... X402_PAY_TO=0x... cargo run -p vinyasa-server
//!
//! # Configure logging level
//! RUST_LOG=debug cargo run -p vinyasa-server
//! ```
//!
//! Configuration is read from the environment (and a `.env` file when
//! present); see [`vinyasa_server::Config`] for the full variable list.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use vinyasa_server::{AppState, Config, router};

#[tokio::main]
async fn main() {
    // Initialize tracing with RUST_LOG env filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("Server failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    // Optional .env for local development; real deployments set the
    // environment directly.
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    tracing::info!(
        mode = ?config.mode,
        network = %config.network,
        facilitator = %config.facilitator_url,
        demo_mode = config.demo_mode,
        "Loaded configuration"
    );

    let state = Arc::new(AppState::from_config(&config)?);
    let app = router(state);

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shut down gracefully");
    Ok(())
}

/// Waits for Ctrl-C or SIGTERM (Unix) to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down..."),
            _ = sigterm.recv() => tracing::info!("Received SIGTERM, shutting down..."),
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.expect("failed to listen for Ctrl-C");
        tracing::info!("Received Ctrl-C, shutting down...");
    }
}
