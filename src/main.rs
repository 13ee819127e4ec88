// =============================================================================
// stockview — Main Entry Point
// =============================================================================
//
// Loads the bar store once from CSV, then serves the read-only HTTP API until
// Ctrl+C.
// =============================================================================

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stockview::api;
use stockview::app_state::AppState;
use stockview::config::ServiceConfig;
use stockview::store::{load_csv_dir, MemoryBarStore};

const DEFAULT_CONFIG_PATH: &str = "stockview_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("stockview starting up");

    let config_path =
        std::env::var("STOCKVIEW_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
    let mut config = ServiceConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(path = %config_path, error = %e, "Failed to load config, using defaults");
        ServiceConfig::default()
    });
    config.apply_env_overrides();

    // ── 2. Bar store ─────────────────────────────────────────────────────
    let mut store = match load_csv_dir(&config.data_dir) {
        Ok((store, report)) => {
            info!(
                files = report.files_loaded,
                failed = report.files_failed,
                bars = report.bars_loaded,
                skipped_rows = report.rows_skipped,
                "CSV data loaded"
            );
            store
        }
        Err(e) => {
            warn!(error = %e, "No bar data loaded, serving an empty store");
            MemoryBarStore::new()
        }
    };
    for (symbol, name) in &config.symbol_names {
        store.set_name(symbol, name.clone());
    }
    info!(
        symbols = store.symbol_count(),
        bars = store.bar_count(),
        "Bar store ready"
    );

    // ── 3. Shared state ──────────────────────────────────────────────────
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config, Arc::new(store)));

    // ── 4. API server ────────────────────────────────────────────────────
    let app = api::rest::router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind API server on {bind_addr}"))?;
    info!(addr = %bind_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
            warn!("Shutdown signal received, stopping gracefully");
        })
        .await
        .context("API server failed")?;

    info!("stockview shut down complete.");
    Ok(())
}
