//! Ticket pool, workers, and lifecycle control for the ticketing simulation.
//!
//! A run moves tickets from vendor tasks through a bounded [`TicketPool`] to
//! customer tasks. The [`SimulationController`] starts, stops, and reports on
//! the single active run.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `ticketing-config.yaml` into
//!   strongly-typed structs.
//! - [`controller`] -- [`SimulationController`] lifecycle and run summaries.
//! - [`pool`] -- The bounded, budget-limited [`TicketPool`].
//! - [`rate`] -- Runtime-adjustable release and retrieval rates.
//! - [`status`] -- Read-only status snapshots for polling.
//! - [`worker`] -- Vendor and customer loops.
//!
//! [`TicketPool`]: pool::TicketPool
//! [`SimulationController`]: controller::SimulationController

pub mod config;
pub mod controller;
pub mod pool;
pub mod rate;
pub mod status;
pub mod worker;

pub use controller::{RateChange, SimulationController, SimulationError, SimulationRun};
pub use pool::{PoolError, PoolLevels, TicketPool};
pub use status::StatusSnapshot;
