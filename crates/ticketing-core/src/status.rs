//! Read-only status projection for polling clients.
//!
//! [`report`] turns the controller's current run (or its absence) into a
//! [`StatusSnapshot`]. The snapshot is a plain `Copy` value: it holds no
//! references into the pool, so callers can keep it as long as they like.

use chrono::{DateTime, Utc};
use ticketing_types::{RunId, StatusResponse, SystemStatus};

use crate::controller::SimulationRun;

/// Immutable copy of the simulation state at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    /// Whether workers are active.
    pub running: bool,
    /// Tickets currently in the pool.
    pub tickets_available: u32,
    /// Tickets released since the run started.
    pub tickets_released: u32,
    /// Tickets retrieved since the run started.
    pub tickets_retrieved: u32,
    /// Configured lifetime budget.
    pub total_tickets: u32,
    /// Configured pool capacity.
    pub max_capacity: u32,
    /// Identifier of the run the snapshot was taken from.
    pub run_id: Option<RunId>,
    /// When that run started.
    pub started_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    /// The snapshot reported when no run exists.
    pub const STOPPED: Self = Self {
        running: false,
        tickets_available: 0,
        tickets_released: 0,
        tickets_retrieved: 0,
        total_tickets: 0,
        max_capacity: 0,
        run_id: None,
        started_at: None,
    };
}

/// Project a run into a snapshot.
///
/// A run that has sold out but has not been reaped yet reports
/// `running: false` with its final counters.
pub fn report(run: Option<&SimulationRun>) -> StatusSnapshot {
    let Some(run) = run else {
        return StatusSnapshot::STOPPED;
    };

    let levels = run.pool().levels();
    let config = run.config();
    StatusSnapshot {
        running: run.is_running(),
        tickets_available: levels.available,
        tickets_released: levels.produced,
        tickets_retrieved: levels.consumed,
        total_tickets: config.total_tickets,
        max_capacity: config.max_capacity,
        run_id: Some(run.run_id()),
        started_at: Some(run.started_at()),
    }
}

impl From<StatusSnapshot> for StatusResponse {
    fn from(snapshot: StatusSnapshot) -> Self {
        Self {
            system_status: SystemStatus::from_running(snapshot.running),
            tickets_available: snapshot.tickets_available,
            tickets_released: snapshot.tickets_released,
            tickets_retrieved: snapshot.tickets_retrieved,
            total_tickets: snapshot.total_tickets,
            max_capacity: snapshot.max_capacity,
            run_id: snapshot.run_id,
            started_at: snapshot.started_at,
        }
    }
}
