//! Response payloads returned by the simulation control API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{SystemStatus, WorkerExit, WorkerRole};
use crate::ids::RunId;
use crate::requests::RunConfig;

/// Body of `GET /api/v1/simulating/status`.
///
/// `systemStatus` and `ticketsAvailable` are the two fields the dashboard
/// polls; the rest mirror the console status screen (released, in pool,
/// retrieved) and are zero when no run is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StatusResponse {
    /// `RUNNING` or `STOPPED`.
    pub system_status: SystemStatus,
    /// Tickets currently in the pool.
    pub tickets_available: u32,
    /// Tickets released by vendors since the run started.
    pub tickets_released: u32,
    /// Tickets retrieved by customers since the run started.
    pub tickets_retrieved: u32,
    /// Configured lifetime budget, or zero when stopped.
    pub total_tickets: u32,
    /// Configured pool capacity, or zero when stopped.
    pub max_capacity: u32,
    /// Identifier of the active run.
    pub run_id: Option<RunId>,
    /// When the active run started (RFC 3339 on the wire).
    pub started_at: Option<DateTime<Utc>>,
}

/// Body returned by a successful `POST /api/v1/simulating/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StartResponse {
    /// Always `true` on the success path.
    pub ok: bool,
    /// Human-readable acknowledgement.
    pub message: String,
    /// Identifier assigned to the new run.
    pub run_id: RunId,
    /// The validated configuration the run was started with.
    pub config: RunConfig,
}

/// Final tally for one worker, recorded when the run is torn down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct WorkerReport {
    /// Vendor or customer.
    pub role: WorkerRole,
    /// Zero-based index within the role.
    pub index: u32,
    /// Tickets this worker released or retrieved.
    pub tickets: u32,
    /// Why the worker stopped.
    pub exit: WorkerExit,
}

/// Summary of a finished run, returned by `POST /api/v1/simulating/stop`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct RunSummary {
    /// Identifier of the run.
    pub run_id: RunId,
    /// Total tickets released.
    pub tickets_released: u32,
    /// Total tickets retrieved.
    pub tickets_retrieved: u32,
    /// Tickets left in the pool when it was closed.
    pub tickets_unsold: u32,
    /// Wall-clock run duration in milliseconds.
    pub elapsed_ms: u64,
    /// One entry per worker, vendors first.
    pub workers: Vec<WorkerReport>,
}

/// Body returned by `POST /api/v1/simulating/stop`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct StopResponse {
    /// Always `true`; stopping is idempotent.
    pub ok: bool,
    /// Human-readable acknowledgement.
    pub message: String,
    /// Summary of the run that was stopped, if one was active.
    pub summary: Option<RunSummary>,
}

/// Body returned by `PUT /api/v1/simulating/updateConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UpdateRatesResponse {
    /// Always `true` on the success path.
    pub ok: bool,
    /// Release rate before the change.
    pub previous_release_rate: u32,
    /// Retrieval rate before the change.
    pub previous_retrieval_rate: u32,
    /// Release rate now in effect.
    pub release_rate: u32,
    /// Retrieval rate now in effect.
    pub retrieval_rate: u32,
}
