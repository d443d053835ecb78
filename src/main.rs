// =============================================================================
// fx-analyzer: Main Entry Point
// =============================================================================
//
// Boot order: .env -> tracing -> runtime config (+ env overrides) -> data
// source -> REST API.  Ctrl-C stops the server.  The config file is read-only
// at runtime; env overrides never reach it.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fx_analyzer::api;
use fx_analyzer::app_state::AppState;
use fx_analyzer::market_data::{CsvDataSource, DataSource};
use fx_analyzer::runtime_config::RuntimeConfig;

const CONFIG_PATH: &str = "fx_analyzer.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "fx-analyzer starting up");

    let config = RuntimeConfig::load_or_default(CONFIG_PATH, |key| std::env::var(key).ok());

    info!(
        symbols = ?config.symbols,
        data_dir = %config.data_dir.display(),
        server_utc_offset_hours = config.server_utc_offset_hours,
        "Configured dashboard"
    );

    // ── 2. Data source ───────────────────────────────────────────────────
    let source = CsvDataSource::open(&config.data_dir)
        .with_context(|| format!("failed to open data directory {}", config.data_dir.display()))?;
    let available = source.symbols().context("failed to list symbols")?;
    let missing: Vec<&String> = config.symbols.iter().filter(|s| !available.contains(*s)).collect();
    if !missing.is_empty() {
        warn!(?missing, "Configured symbols have no entry in symbols.json");
    }

    // ── 3. Shared state ──────────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, Arc::new(source)));

    // ── 4. API server ────────────────────────────────────────────────────
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server to {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl-C");
            }
            info!("Shutdown signal received");
        })
        .await
        .context("API server failed")?;

    info!("fx-analyzer stopped");
    Ok(())
}
