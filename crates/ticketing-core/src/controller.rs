//! Simulation lifecycle: start, stop, status, and rate changes.
//!
//! [`SimulationController`] owns at most one active run. A run is a
//! [`TicketPool`], a [`RateCell`], and one Tokio task per worker. The
//! controller keeps a handle to every worker task and joins all of them on
//! stop, so no worker outlives its run.
//!
//! # State machine
//!
//! ```text
//!            start(config)                 stop()
//! Stopped ----------------> Running ---------------> Stopped
//!    ^                         |
//!    |   all workers exit      |
//!    +------ (sold out) -------+   reaped by the next start/stop
//! ```
//!
//! Lifecycle calls are serialized by an async mutex. Status reads go
//! through a separate `RwLock` holding only an `Arc` to the current run, so
//! a poll never waits behind a stop that is joining workers.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use ticketing_types::{
    FieldError, RateUpdate, RunConfig, RunId, RunSummary, WorkerExit, WorkerReport, WorkerRole,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::SimulationSettings;
use crate::pool::TicketPool;
use crate::rate::RateCell;
use crate::status::{self, StatusSnapshot};
use crate::worker::{self, WorkerContext};

/// Errors reported synchronously to callers of the controller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    /// A start request carried a missing or non-positive field.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] FieldError),

    /// `start` was called while a run is active.
    #[error("simulation already running (run {run_id})")]
    AlreadyRunning {
        /// The run that is already active.
        run_id: RunId,
    },

    /// The operation needs an active run and there is none.
    #[error("no simulation is running")]
    NotRunning,

    /// A rate change asked for a rate of zero.
    #[error("{field} must be at least 1")]
    InvalidRate {
        /// Wire name of the rejected rate.
        field: &'static str,
    },
}

/// One simulation run: configuration, pool, rates, and liveness.
#[derive(Debug)]
pub struct SimulationRun {
    run_id: RunId,
    config: RunConfig,
    started_at: DateTime<Utc>,
    started: Instant,
    pool: Arc<TicketPool>,
    rates: Arc<RateCell>,
    live_workers: AtomicU32,
}

impl SimulationRun {
    pub(crate) fn new(config: RunConfig) -> Self {
        Self {
            run_id: RunId::new(),
            config,
            started_at: Utc::now(),
            started: Instant::now(),
            pool: Arc::new(TicketPool::new(config.max_capacity, config.total_tickets)),
            rates: Arc::new(RateCell::new(config.release_rate, config.retrieval_rate)),
            live_workers: AtomicU32::new(0),
        }
    }

    /// Identifier of this run.
    pub const fn run_id(&self) -> RunId {
        self.run_id
    }

    /// The configuration the run was started with.
    ///
    /// Rates here are the starting rates; see [`rates`](Self::rates) for
    /// the current ones.
    pub const fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The run's ticket pool.
    pub fn pool(&self) -> &TicketPool {
        &self.pool
    }

    /// The run's current rates.
    pub fn rates(&self) -> &RateCell {
        &self.rates
    }

    /// Whether the pool is open and at least one worker is still looping.
    pub fn is_running(&self) -> bool {
        !self.pool.is_closed() && self.live_workers.load(Ordering::Acquire) > 0
    }

    pub(crate) fn worker_started(&self) {
        self.live_workers.fetch_add(1, Ordering::AcqRel);
    }

    fn worker_exited(&self) {
        // Saturate rather than wrap if an exit is ever double-counted.
        let _ = self
            .live_workers
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }
}

/// Result of a successful rate change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateChange {
    /// Release rate before the change.
    pub previous_release_rate: u32,
    /// Retrieval rate before the change.
    pub previous_retrieval_rate: u32,
    /// Release rate now in effect.
    pub release_rate: u32,
    /// Retrieval rate now in effect.
    pub retrieval_rate: u32,
}

#[derive(Debug)]
struct WorkerHandle {
    role: WorkerRole,
    index: u32,
    handle: JoinHandle<WorkerReport>,
}

#[derive(Debug)]
struct ActiveRun {
    run: Arc<SimulationRun>,
    workers: Vec<WorkerHandle>,
}

/// Owner of the single simulation run.
#[derive(Debug)]
pub struct SimulationController {
    settings: SimulationSettings,
    lifecycle: Mutex<Option<ActiveRun>>,
    current: RwLock<Option<Arc<SimulationRun>>>,
}

impl SimulationController {
    /// Create a stopped controller. `settings` fixes the worker counts,
    /// batch size, and stop timeout for every run.
    pub fn new(settings: SimulationSettings) -> Self {
        Self {
            settings,
            lifecycle: Mutex::new(None),
            current: RwLock::new(None),
        }
    }

    /// The worker settings applied to every run.
    pub const fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    fn current(&self) -> Option<Arc<SimulationRun>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_current(&self, run: Option<Arc<SimulationRun>>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = run;
    }

    /// Start a new run.
    ///
    /// A previous run that ended on its own (sold out) is reaped first.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::InvalidConfiguration`] if any field is zero.
    ///   Nothing is created.
    /// - [`SimulationError::AlreadyRunning`] if a run is active. The active
    ///   run is untouched.
    pub async fn start(&self, config: RunConfig) -> Result<RunId, SimulationError> {
        config.validate()?;

        let mut active = self.lifecycle.lock().await;

        if let Some(existing) = active.as_ref().filter(|a| a.run.is_running()) {
            return Err(SimulationError::AlreadyRunning {
                run_id: existing.run.run_id(),
            });
        }
        if let Some(finished) = active.take() {
            let summary = self.teardown(finished).await;
            debug!(run_id = %summary.run_id, "reaped finished run before start");
        }

        let run = Arc::new(SimulationRun::new(config));
        let ctx = WorkerContext {
            pool: Arc::clone(&run.pool),
            rates: Arc::clone(&run.rates),
            batch_size: self.settings.batch_size,
        };

        let mut workers = Vec::new();
        for index in 0..self.settings.vendors {
            workers.push(spawn_worker(&run, WorkerRole::Vendor, index, ctx.clone()));
        }
        for index in 0..self.settings.customers {
            workers.push(spawn_worker(&run, WorkerRole::Customer, index, ctx.clone()));
        }

        info!(
            run_id = %run.run_id(),
            total_tickets = config.total_tickets,
            release_rate = config.release_rate,
            retrieval_rate = config.retrieval_rate,
            max_capacity = config.max_capacity,
            vendors = self.settings.vendors,
            customers = self.settings.customers,
            batch_size = self.settings.batch_size,
            "Simulation started"
        );

        let run_id = run.run_id();
        self.set_current(Some(Arc::clone(&run)));
        *active = Some(ActiveRun { run, workers });
        Ok(run_id)
    }

    /// Stop the current run, if any, and wait for its workers.
    ///
    /// Closes the pool, which wakes every worker whether it is pacing or
    /// blocked inside the pool, then joins each worker. Workers still
    /// running after the stop timeout are aborted. Returns `None` when
    /// there was nothing to stop.
    pub async fn stop(&self) -> Option<RunSummary> {
        let mut active = self.lifecycle.lock().await;

        let Some(run) = active.take() else {
            debug!("stop requested with no active run");
            return None;
        };

        let summary = self.teardown(run).await;
        self.set_current(None);

        info!(
            run_id = %summary.run_id,
            tickets_released = summary.tickets_released,
            tickets_retrieved = summary.tickets_retrieved,
            tickets_unsold = summary.tickets_unsold,
            elapsed_ms = summary.elapsed_ms,
            "Simulation stopped"
        );
        Some(summary)
    }

    /// Take a snapshot of the current run.
    ///
    /// Never waits on lifecycle operations; the only lock taken inside the
    /// pool is the ledger mutex for the duration of a copy.
    pub fn status(&self) -> StatusSnapshot {
        status::report(self.current().as_deref())
    }

    /// Change the active run's rates.
    ///
    /// Both rates are checked before either is applied.
    ///
    /// # Errors
    ///
    /// - [`SimulationError::NotRunning`] if there is no active run.
    /// - [`SimulationError::InvalidRate`] if a supplied rate is zero.
    pub fn update_rates(&self, update: RateUpdate) -> Result<RateChange, SimulationError> {
        if update.release_rate == Some(0) {
            return Err(SimulationError::InvalidRate {
                field: "releaseRate",
            });
        }
        if update.retrieval_rate == Some(0) {
            return Err(SimulationError::InvalidRate {
                field: "retrievalRate",
            });
        }

        let run = self
            .current()
            .filter(|run| run.is_running())
            .ok_or(SimulationError::NotRunning)?;
        let rates = run.rates();

        let previous_release_rate = update
            .release_rate
            .and_then(|rate| rates.set_release_rate(rate))
            .unwrap_or_else(|| rates.release_rate());
        let previous_retrieval_rate = update
            .retrieval_rate
            .and_then(|rate| rates.set_retrieval_rate(rate))
            .unwrap_or_else(|| rates.retrieval_rate());

        let change = RateChange {
            previous_release_rate,
            previous_retrieval_rate,
            release_rate: rates.release_rate(),
            retrieval_rate: rates.retrieval_rate(),
        };
        info!(
            run_id = %run.run_id(),
            release_rate = change.release_rate,
            retrieval_rate = change.retrieval_rate,
            "Rates updated"
        );
        Ok(change)
    }

    /// Close the run's pool, join every worker, and summarize.
    async fn teardown(&self, active: ActiveRun) -> RunSummary {
        let ActiveRun { run, workers } = active;
        run.pool().close();

        let timeout = self.settings.stop_timeout();
        let joining = Instant::now();
        let mut reports = Vec::with_capacity(workers.len());

        for mut worker in workers {
            let remaining = timeout.saturating_sub(joining.elapsed());
            let report = match tokio::time::timeout(remaining, &mut worker.handle).await {
                Ok(Ok(report)) => report,
                Ok(Err(err)) => {
                    warn!(
                        role = %worker.role,
                        index = worker.index,
                        error = %err,
                        "worker task failed"
                    );
                    aborted_report(&worker)
                }
                Err(_elapsed) => {
                    worker.handle.abort();
                    warn!(
                        role = %worker.role,
                        index = worker.index,
                        timeout_ms = self.settings.stop_timeout_ms,
                        "worker did not stop in time, aborted"
                    );
                    aborted_report(&worker)
                }
            };
            reports.push(report);
        }

        let levels = run.pool().levels();
        RunSummary {
            run_id: run.run_id(),
            tickets_released: levels.produced,
            tickets_retrieved: levels.consumed,
            tickets_unsold: levels.available,
            elapsed_ms: u64::try_from(run.started.elapsed().as_millis()).unwrap_or(u64::MAX),
            workers: reports,
        }
    }
}

fn spawn_worker(
    run: &Arc<SimulationRun>,
    role: WorkerRole,
    index: u32,
    ctx: WorkerContext,
) -> WorkerHandle {
    run.worker_started();
    let owner = Arc::clone(run);
    let handle = tokio::spawn(async move {
        let report = match role {
            WorkerRole::Vendor => worker::run_vendor(index, ctx).await,
            WorkerRole::Customer => worker::run_customer(index, ctx).await,
        };
        owner.worker_exited();
        report
    });
    WorkerHandle {
        role,
        index,
        handle,
    }
}

const fn aborted_report(worker: &WorkerHandle) -> WorkerReport {
    WorkerReport {
        role: worker.role,
        index: worker.index,
        tickets: 0,
        exit: WorkerExit::Aborted,
    }
}
