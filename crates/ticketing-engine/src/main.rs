//! Engine binary for the ticketing simulation.
//!
//! Wires the simulation controller to the control API and runs until
//! `Ctrl-C`. Simulation runs themselves are started and stopped over HTTP;
//! the binary only owns the process lifecycle.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `ticketing-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the simulation controller
//! 4. Start the control API
//! 5. Wait for `Ctrl-C`
//! 6. Stop the active run (if any) and drain the API

mod error;

use std::path::Path;
use std::sync::Arc;

use ticketing_api::{AppState, ServerConfig};
use ticketing_core::config::{EngineConfig, LoggingConfig};
use ticketing_core::SimulationController;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

const CONFIG_FILE: &str = "ticketing-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the API cannot bind, or
/// the shutdown signal cannot be installed.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration. Logging is not up yet, so remember whether the
    //    file was found and report it afterwards.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!("ticketing-engine starting");
    if !from_file {
        info!(path = CONFIG_FILE, "Config file not found, using defaults");
    }
    info!(
        host = config.server.host,
        port = config.server.port,
        vendors = config.simulation.vendors,
        customers = config.simulation.customers,
        batch_size = config.simulation.batch_size,
        stop_timeout_ms = config.simulation.stop_timeout_ms,
        "Configuration loaded"
    );

    // 3. Create the controller.
    let controller = Arc::new(SimulationController::new(config.simulation.clone()));

    // 4. Start the control API.
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        allowed_origin: config.server.allowed_origin.clone(),
    };
    let state = Arc::new(AppState::new(Arc::clone(&controller)));
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let api_handle = ticketing_api::spawn_api(server_config, state, async move {
        let _ = shutdown_rx.await;
    })
    .await?;

    // 5. Wait for Ctrl-C.
    tokio::signal::ctrl_c()
        .await
        .map_err(|source| EngineError::Signal { source })?;
    info!("Shutdown signal received");

    // 6. Stop the run, then let the API drain.
    if let Some(summary) = controller.stop().await {
        info!(
            run_id = %summary.run_id,
            tickets_released = summary.tickets_released,
            tickets_retrieved = summary.tickets_retrieved,
            tickets_unsold = summary.tickets_unsold,
            "Active run stopped on shutdown"
        );
    }

    let _ = shutdown_tx.send(());
    if let Err(e) = api_handle.await {
        warn!(error = %e, "Control API task did not exit cleanly");
    }

    info!("ticketing-engine shutdown complete");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load the engine configuration from `ticketing-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
/// Environment overrides apply either way. The flag reports whether the
/// file existed.
fn load_config() -> Result<(EngineConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_FILE);
    if config_path.exists() {
        let config = EngineConfig::from_file(config_path)?;
        Ok((config, true))
    } else {
        let mut config = EngineConfig::default();
        config.server.apply_env_overrides()?;
        Ok((config, false))
    }
}
