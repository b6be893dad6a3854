// =============================================================================
// Indicator Dashboard — Main Entry Point
// =============================================================================
//
// Serves a form that charts a technical indicator fetched from Alpha Vantage.
// Configuration is read and validated once here; a missing API key stops the
// process before the listener is bound.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod alpha_vantage;
mod api;
mod app_state;
mod chart;
mod config;
mod form;
mod pipeline;
mod series;
mod types;

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::alpha_vantage::client::AlphaVantageClient;
use crate::app_state::AppState;
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Indicator Dashboard — starting up");

    // ── 2. Configuration ─────────────────────────────────────────────────
    let config = AppConfig::from_env().context("invalid configuration")?;

    // ── 3. Indicator source ──────────────────────────────────────────────
    let client = AlphaVantageClient::new(&config).context("failed to build HTTP client")?;
    let state = Arc::new(AppState::new(Arc::new(client)));

    // ── 4. HTTP server ───────────────────────────────────────────────────
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Indicator Dashboard shut down complete.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received — stopping gracefully");
}
