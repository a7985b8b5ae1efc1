//! REST endpoint handlers for the simulation control API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/v1/simulating/start` | Start a run |
//! | `POST` | `/api/v1/simulating/stop` | Stop the current run |
//! | `GET` | `/api/v1/simulating/status` | Current status snapshot |
//! | `PUT` | `/api/v1/simulating/updateConfig` | Change rates of the current run |

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use ticketing_types::{
    StartRequest, StartResponse, StatusResponse, StopResponse, UpdateRatesRequest,
    UpdateRatesResponse,
};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /api/v1/simulating/start
// ---------------------------------------------------------------------------

/// Start a simulation run.
///
/// Accepts counts as JSON numbers or numeric strings. A malformed body or
/// any missing or non-positive field is a 400 and nothing starts; a start
/// while a run is active is a 409 and the active run is untouched.
pub async fn start(
    State(state): State<Arc<AppState>>,
    body: Result<Json<StartRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let config = request.into_run_config().inspect_err(|err| {
        warn!(error = %err, "rejected start request");
    })?;

    let run_id = state.controller.start(config).await?;

    Ok(Json(StartResponse {
        ok: true,
        message: "Simulation started".to_owned(),
        run_id,
        config,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/v1/simulating/stop
// ---------------------------------------------------------------------------

/// Stop the current run and wait for its workers.
///
/// Always succeeds. The summary is absent when nothing was running.
pub async fn stop(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let summary = state.controller.stop().await;
    let message = if summary.is_some() {
        "Simulation stopped"
    } else {
        "Simulation was not running"
    };

    Json(StopResponse {
        ok: true,
        message: message.to_owned(),
        summary,
    })
}

// ---------------------------------------------------------------------------
// GET /api/v1/simulating/status
// ---------------------------------------------------------------------------

/// Return the current status snapshot.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse::from(state.controller.status()))
}

// ---------------------------------------------------------------------------
// PUT /api/v1/simulating/updateConfig
// ---------------------------------------------------------------------------

/// Change the release and/or retrieval rate of the active run.
///
/// The new rates apply from each worker's next cycle.
pub async fn update_config(
    State(state): State<Arc<AppState>>,
    body: Result<Json<UpdateRatesRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body?;
    let update = request.into_rate_update()?;
    let change = state.controller.update_rates(update)?;

    Ok(Json(UpdateRatesResponse {
        ok: true,
        previous_release_rate: change.previous_release_rate,
        previous_retrieval_rate: change.previous_retrieval_rate,
        release_rate: change.release_rate,
        retrieval_rate: change.retrieval_rate,
    }))
}
