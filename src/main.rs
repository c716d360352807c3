// =============================================================================
// stock-lens — Main Entry Point
// =============================================================================
//
// Loads the analyzer config, builds shared state and serves the REST API until
// Ctrl-C.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stock_lens::api;
use stock_lens::app_state::AppState;
use stock_lens::runtime_config::AnalyzerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("stock-lens starting up");

    let config_path =
        std::env::var("STOCK_LENS_CONFIG").unwrap_or_else(|_| "analyzer_config.json".into());
    let config = AnalyzerConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(path = %config_path, error = %e, "Failed to load config, using defaults");
        AnalyzerConfig::default()
    });

    // ── 2. Build shared state ────────────────────────────────────────────
    let state = Arc::new(AppState::new(config));
    {
        let reference = state.reference.read();
        info!(symbols = ?reference.symbols(), "Reference table ready");
    }
    {
        let config = state.config.read();
        info!(
            required_history = config.indicators.required_history(),
            default_period = %config.default_period,
            "Analyzer configured"
        );
    }

    // ── 3. Start the API server ──────────────────────────────────────────
    let bind_addr =
        std::env::var("STOCK_LENS_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    let app = api::rest::router(state.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!(
        reports = state.recent_reports.read().len(),
        uptime_secs = state.uptime_secs(),
        "stock-lens shut down"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
