//! Enumeration types shared between the engine and its HTTP clients.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Coarse lifecycle state reported to polling clients.
///
/// Serialized in upper case (`"RUNNING"` / `"STOPPED"`) because that is
/// what the dashboard compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum SystemStatus {
    /// Workers are active and the pool is open.
    Running,
    /// No run is active (never started, stopped, or sold out).
    Stopped,
}

impl SystemStatus {
    /// Map a boolean "is running" flag to the wire enum.
    pub const fn from_running(running: bool) -> Self {
        if running { Self::Running } else { Self::Stopped }
    }
}

/// Which side of the pool a worker operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum WorkerRole {
    /// Producer releasing tickets into the pool.
    Vendor,
    /// Consumer retrieving (purchasing) tickets from the pool.
    Customer,
}

impl core::fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Vendor => f.write_str("vendor"),
            Self::Customer => f.write_str("customer"),
        }
    }
}

/// Why a worker left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum WorkerExit {
    /// A vendor released its share of the total budget.
    BudgetExhausted,
    /// A customer found the pool empty with nothing left to release.
    SoldOut,
    /// The pool was closed by a stop request.
    Cancelled,
    /// The worker did not exit within the stop timeout and was aborted.
    Aborted,
}
