//! Shared type definitions for the real-time ticket pool simulation.
//!
//! These are the wire types exchanged between the engine and the dashboard.
//! They flow downstream to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers
//! - [`enums`] -- System status, worker roles, and worker exit reasons
//! - [`requests`] -- Start and rate-update payloads with numeric-string parsing
//! - [`responses`] -- Status, start, stop, and rate-update bodies

pub mod enums;
pub mod ids;
pub mod requests;
pub mod responses;

// Re-export all public types at crate root for convenience.
pub use enums::{SystemStatus, WorkerExit, WorkerRole};
pub use ids::RunId;
pub use requests::{FieldError, NumericField, RateUpdate, RunConfig, StartRequest, UpdateRatesRequest};
pub use responses::{
    RunSummary, StartResponse, StatusResponse, StopResponse, UpdateRatesResponse, WorkerReport,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // The files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        let _ = crate::ids::RunId::export_all();

        let _ = crate::enums::SystemStatus::export_all();
        let _ = crate::enums::WorkerRole::export_all();
        let _ = crate::enums::WorkerExit::export_all();

        let _ = crate::requests::StartRequest::export_all();
        let _ = crate::requests::RunConfig::export_all();
        let _ = crate::requests::UpdateRatesRequest::export_all();

        let _ = crate::responses::StatusResponse::export_all();
        let _ = crate::responses::StartResponse::export_all();
        let _ = crate::responses::StopResponse::export_all();
        let _ = crate::responses::RunSummary::export_all();
        let _ = crate::responses::WorkerReport::export_all();
        let _ = crate::responses::UpdateRatesResponse::export_all();
    }
}
