//! # Laune Map
//!
//! Entry point for the headless mood map client.

use std::sync::Arc;

use tokio::sync::Mutex;

use laune_map::cli::run_console;
use laune_map::config::AppConfig;
use laune_map::map::{MarkerBinding, TracingSurface};
use laune_map::state::AppState;
use laune_map::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_telemetry(&config.telemetry);

    tracing::info!(service = %config.telemetry.service_name, "Starting Laune Map");

    let state = AppState::new(&config)?;
    let controller = state.controller.clone();

    if let Err(e) = state.loader.ensure_loaded().await {
        tracing::warn!(error = %e, "Map SDK unavailable, continuing without it");
    }

    controller.initialize().await;
    if let Err(e) = controller.start_background(&config.background).await {
        tracing::error!(error = %e, "Failed to start background jobs");
    }

    let binding = Arc::new(Mutex::new(MarkerBinding::new(TracingSurface)));
    let markers = tokio::spawn(MarkerBinding::run(binding.clone(), controller.subscribe()));

    tokio::select! {
        result = run_console(controller.clone(), binding) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Console input failed");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupt received");
        }
    }

    controller.shutdown().await;
    markers.abort();
    tracing::info!("Laune Map stopped");
    Ok(())
}
