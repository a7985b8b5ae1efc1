//! Control API startup helper for embedding in the engine binary.
//!
//! Provides [`spawn_api`] which launches the HTTP server on a background
//! Tokio task so the binary can wait for a shutdown signal alongside it.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ticketing_api::startup::spawn_api;
//! use ticketing_api::{AppState, ServerConfig};
//! use std::sync::Arc;
//!
//! let state = Arc::new(AppState::new(controller));
//! let handle = spawn_api(ServerConfig::default(), state, shutdown).await?;
//! // Resolve `shutdown`, then await the handle.
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the control API server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the control API server on a background Tokio task.
///
/// The returned handle resolves once `shutdown` has fired and in-flight
/// requests have drained.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the address is invalid or the port
/// cannot be bound. This is detected eagerly with a probe bind before the
/// background task is spawned.
pub async fn spawn_api<F>(
    config: ServerConfig,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<JoinHandle<()>, StartupError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = config.socket_addr()?;
    // Probe bind; the listener is dropped before the server binds again.
    drop(
        TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?,
    );

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::start_server(&config, state, shutdown).await {
            tracing::error!(error = %e, "Control API exited with error");
        }
    });

    tracing::info!(%addr, "Control API spawned on background task");

    Ok(handle)
}
