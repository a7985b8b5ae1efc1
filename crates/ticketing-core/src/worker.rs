//! Vendor and customer worker loops.
//!
//! Each worker is a plain async function spawned as its own Tokio task by
//! the controller. A worker paces itself with `1 / rate` second sleeps,
//! performs one pool operation per cycle, and returns a [`WorkerReport`]
//! when its loop ends. Workers never talk to each other; the pool is the
//! only thing they share.
//!
//! Sleeps race against [`TicketPool::wait_closed`], so a stop request
//! interrupts a worker whether it is pacing or blocked inside the pool.

use std::sync::Arc;
use std::time::Duration;

use ticketing_types::{WorkerExit, WorkerReport, WorkerRole};
use tracing::{debug, info, warn};

use crate::pool::{PoolError, TicketPool};
use crate::rate::RateCell;

/// Everything a worker needs, cloned once per spawned task.
#[derive(Debug, Clone)]
pub struct WorkerContext {
    /// The shared pool.
    pub pool: Arc<TicketPool>,
    /// Shared, runtime-adjustable rates.
    pub rates: Arc<RateCell>,
    /// Tickets moved per pool operation.
    pub batch_size: u32,
}

/// Sleep for `interval` unless the pool closes first.
///
/// Returns `false` if the pool closed.
async fn pace(pool: &TicketPool, interval: Duration) -> bool {
    tokio::select! {
        () = tokio::time::sleep(interval) => true,
        () = pool.wait_closed() => false,
    }
}

/// Release tickets until the budget is exhausted or the pool closes.
///
/// Each batch is clamped to the remaining budget so the final partial batch
/// still goes out.
pub async fn run_vendor(index: u32, ctx: WorkerContext) -> WorkerReport {
    let pool = &ctx.pool;
    let mut released: u32 = 0;

    let exit = loop {
        let remaining = pool.remaining_budget();
        if remaining == 0 {
            break WorkerExit::BudgetExhausted;
        }

        if !pace(pool, ctx.rates.interval_for(WorkerRole::Vendor)).await {
            break WorkerExit::Cancelled;
        }

        let amount = ctx
            .batch_size
            .min(pool.remaining_budget())
            .min(pool.capacity());
        if amount == 0 {
            break WorkerExit::BudgetExhausted;
        }

        match pool.produce(amount).await {
            Ok(levels) => {
                released = released.saturating_add(amount);
                debug!(
                    vendor = index,
                    amount,
                    available = levels.available,
                    produced = levels.produced,
                    "vendor released tickets"
                );
            }
            Err(PoolError::BudgetExhausted { .. }) => break WorkerExit::BudgetExhausted,
            Err(PoolError::Cancelled) => break WorkerExit::Cancelled,
            Err(err) => {
                warn!(vendor = index, error = %err, "vendor stopping on pool error");
                break WorkerExit::Cancelled;
            }
        }
    };

    info!(vendor = index, released, ?exit, "vendor finished");
    WorkerReport {
        role: WorkerRole::Vendor,
        index,
        tickets: released,
        exit,
    }
}

/// Retrieve tickets until the pool sells out or closes.
///
/// When the budget is spent and fewer than a full batch remain, the next
/// attempt asks for exactly what is left.
pub async fn run_customer(index: u32, ctx: WorkerContext) -> WorkerReport {
    let pool = &ctx.pool;
    let mut retrieved: u32 = 0;
    let mut wanted = ctx.batch_size.min(pool.capacity());

    let exit = loop {
        if !pace(pool, ctx.rates.interval_for(WorkerRole::Customer)).await {
            break WorkerExit::Cancelled;
        }

        match pool.consume(wanted).await {
            Ok(levels) => {
                retrieved = retrieved.saturating_add(wanted);
                debug!(
                    customer = index,
                    amount = wanted,
                    available = levels.available,
                    consumed = levels.consumed,
                    "customer retrieved tickets"
                );
            }
            Err(PoolError::SoldOut { remaining: 0 }) => break WorkerExit::SoldOut,
            Err(PoolError::SoldOut { remaining }) => wanted = remaining,
            Err(PoolError::Cancelled) => break WorkerExit::Cancelled,
            Err(err) => {
                warn!(customer = index, error = %err, "customer stopping on pool error");
                break WorkerExit::Cancelled;
            }
        }
    };

    info!(customer = index, retrieved, ?exit, "customer finished");
    WorkerReport {
        role: WorkerRole::Customer,
        index,
        tickets: retrieved,
        exit,
    }
}
