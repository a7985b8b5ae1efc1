//! Shared application state for the control API.

use std::sync::Arc;

use ticketing_core::SimulationController;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// controller is the only thing handlers touch.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The simulation controller owning the current run.
    pub controller: Arc<SimulationController>,
}

impl AppState {
    /// Create application state around an existing controller.
    pub const fn new(controller: Arc<SimulationController>) -> Self {
        Self { controller }
    }
}
