//! Axum router construction for the control API.
//!
//! Assembles all routes into a single [`Router`] with CORS middleware so
//! the browser dashboard can call the API from its own origin.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers;
use crate::state::AppState;

/// Build the router with CORS open to any origin.
///
/// The router includes:
/// - `POST /api/v1/simulating/start` -- start a run
/// - `POST /api/v1/simulating/stop` -- stop the current run
/// - `GET /api/v1/simulating/status` -- status snapshot
/// - `PUT /api/v1/simulating/updateConfig` -- change rates
pub fn build_router(state: Arc<AppState>) -> Router {
    build_router_with_origin(state, None)
}

/// Build the router, restricting CORS to `allowed_origin` when given.
///
/// An origin that is not a valid header value is logged and CORS falls
/// back to allowing any origin.
pub fn build_router_with_origin(state: Arc<AppState>, allowed_origin: Option<&str>) -> Router {
    let origin = match allowed_origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(err)) => {
            warn!(error = %err, "invalid allowed_origin, allowing any origin");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/simulating/start", post(handlers::start))
        .route("/api/v1/simulating/stop", post(handlers::stop))
        .route("/api/v1/simulating/status", get(handlers::status))
        .route("/api/v1/simulating/updateConfig", put(handlers::update_config))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
