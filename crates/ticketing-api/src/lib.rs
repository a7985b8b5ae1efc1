//! Simulation control API for the ticketing engine.
//!
//! This crate provides an Axum HTTP server that exposes the
//! `/api/v1/simulating/*` endpoints the dashboard uses to start, stop,
//! poll, and retune a simulation run.
//!
//! # Architecture
//!
//! Handlers are thin: they parse the request into core types, call the
//! shared [`SimulationController`], and map [`SimulationError`] onto HTTP
//! status codes through [`ApiError`]. Status polls never wait on a start or
//! stop in progress.
//!
//! [`SimulationController`]: ticketing_core::SimulationController
//! [`SimulationError`]: ticketing_core::SimulationError
//! [`ApiError`]: error::ApiError

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::{build_router, build_router_with_origin};
pub use server::{start_server, ServerConfig, ServerError};
pub use startup::{spawn_api, StartupError};
pub use state::AppState;
