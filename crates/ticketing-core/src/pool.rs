//! The bounded ticket pool shared by vendors and customers.
//!
//! [`TicketPool`] is the only piece of mutable state workers share. All
//! counters live in a single [`PoolLevels`] value behind one mutex, so every
//! produce or consume moves `available`, `produced`, and `consumed` in one
//! step and readers never see a half-applied update.
//!
//! Blocking is done with [`Notify`] rather than spinning:
//!
//! - producers wait on `space_freed` while the pool is full,
//! - consumers wait on `tickets_added` while the pool is short,
//! - [`close`](TicketPool::close) wakes both groups plus anyone pacing
//!   between operations, and every waiter re-checks the `closed` flag before
//!   retrying.
//!
//! Each wait registers interest (`Notified::enable`) *before* inspecting the
//! ledger, so a notification that lands between the check and the await is
//! not lost.
//!
//! # Invariants
//!
//! - `0 <= available <= capacity`
//! - `produced <= total_budget`
//! - `produced == consumed + available`

use std::pin::pin;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tracing::trace;

/// Errors returned by pool operations.
///
/// Only [`ZeroAmount`](Self::ZeroAmount) and
/// [`ExceedsCapacity`](Self::ExceedsCapacity) indicate caller mistakes; the
/// other variants are normal ways for a worker's loop to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// Operations must move at least one ticket.
    #[error("ticket amount must be at least 1")]
    ZeroAmount,

    /// The request can never fit in the pool.
    #[error("amount {amount} exceeds pool capacity {capacity}")]
    ExceedsCapacity {
        /// Requested amount.
        amount: u32,
        /// Pool capacity.
        capacity: u32,
    },

    /// Releasing `amount` more tickets would exceed the run's total budget.
    #[error("total budget exhausted ({produced}/{total_budget} released)")]
    BudgetExhausted {
        /// Tickets released so far.
        produced: u32,
        /// Lifetime budget for the run.
        total_budget: u32,
    },

    /// The budget is fully released and too few tickets remain to satisfy
    /// the request.
    #[error("sold out ({remaining} tickets remain)")]
    SoldOut {
        /// Tickets still sitting in the pool.
        remaining: u32,
    },

    /// The pool was closed while the operation was pending.
    #[error("ticket pool closed")]
    Cancelled,
}

/// Point-in-time counters of a [`TicketPool`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolLevels {
    /// Tickets currently in the pool.
    pub available: u32,
    /// Tickets released since the pool was created.
    pub produced: u32,
    /// Tickets retrieved since the pool was created.
    pub consumed: u32,
}

#[derive(Debug, Default)]
struct Ledger {
    levels: PoolLevels,
    closed: bool,
}

/// A bounded pool of tickets with backpressure and cancellation.
#[derive(Debug)]
pub struct TicketPool {
    capacity: u32,
    total_budget: u32,
    ledger: Mutex<Ledger>,
    space_freed: Notify,
    tickets_added: Notify,
    closing: Notify,
}

impl TicketPool {
    /// Create an open, empty pool.
    pub fn new(capacity: u32, total_budget: u32) -> Self {
        Self {
            capacity,
            total_budget,
            ledger: Mutex::new(Ledger::default()),
            space_freed: Notify::new(),
            tickets_added: Notify::new(),
            closing: Notify::new(),
        }
    }

    /// Maximum number of tickets held at once.
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Lifetime cap on tickets released into this pool.
    pub const fn total_budget(&self) -> u32 {
        self.total_budget
    }

    // The ledger is never left half-updated, so a poisoned lock still
    // holds consistent counters.
    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_amount(&self, amount: u32) -> Result<(), PoolError> {
        if amount == 0 {
            return Err(PoolError::ZeroAmount);
        }
        if amount > self.capacity {
            return Err(PoolError::ExceedsCapacity {
                amount,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Release `amount` tickets into the pool.
    ///
    /// Waits while the pool lacks room for the whole batch. Returns the
    /// levels immediately after the release.
    ///
    /// # Errors
    ///
    /// - [`PoolError::BudgetExhausted`] if the batch would push `produced`
    ///   past the total budget. Checked before capacity, so a vendor blocked
    ///   on a full pool still learns when another vendor used up the budget.
    /// - [`PoolError::Cancelled`] if the pool is or becomes closed.
    /// - [`PoolError::ZeroAmount`] / [`PoolError::ExceedsCapacity`] for
    ///   amounts that can never succeed.
    pub async fn produce(&self, amount: u32) -> Result<PoolLevels, PoolError> {
        self.check_amount(amount)?;

        loop {
            let mut notified = pin!(self.space_freed.notified());
            notified.as_mut().enable();

            {
                let mut ledger = self.lock();
                if ledger.closed {
                    return Err(PoolError::Cancelled);
                }

                let produced = ledger
                    .levels
                    .produced
                    .checked_add(amount)
                    .filter(|p| *p <= self.total_budget)
                    .ok_or(PoolError::BudgetExhausted {
                        produced: ledger.levels.produced,
                        total_budget: self.total_budget,
                    })?;

                let available = ledger
                    .levels
                    .available
                    .checked_add(amount)
                    .filter(|a| *a <= self.capacity);

                if let Some(available) = available {
                    ledger.levels.available = available;
                    ledger.levels.produced = produced;
                    let levels = ledger.levels;
                    drop(ledger);

                    trace!(amount, available, produced, "tickets released");
                    self.tickets_added.notify_waiters();
                    return Ok(levels);
                }
            }

            notified.await;
        }
    }

    /// Retrieve `amount` tickets from the pool.
    ///
    /// Waits while fewer than `amount` tickets are available and more may
    /// still be released. Returns the levels immediately after the
    /// retrieval.
    ///
    /// # Errors
    ///
    /// - [`PoolError::SoldOut`] if the budget is fully released and the pool
    ///   holds fewer than `amount` tickets.
    /// - [`PoolError::Cancelled`] if the pool is or becomes closed.
    /// - [`PoolError::ZeroAmount`] / [`PoolError::ExceedsCapacity`] for
    ///   amounts that can never succeed.
    pub async fn consume(&self, amount: u32) -> Result<PoolLevels, PoolError> {
        self.check_amount(amount)?;

        loop {
            let mut notified = pin!(self.tickets_added.notified());
            notified.as_mut().enable();

            {
                let mut ledger = self.lock();
                if ledger.closed {
                    return Err(PoolError::Cancelled);
                }

                if let Some(available) = ledger.levels.available.checked_sub(amount) {
                    ledger.levels.available = available;
                    ledger.levels.consumed = ledger.levels.consumed.saturating_add(amount);
                    let levels = ledger.levels;
                    drop(ledger);

                    trace!(amount, available, consumed = levels.consumed, "tickets retrieved");
                    self.space_freed.notify_waiters();
                    return Ok(levels);
                }

                if ledger.levels.produced >= self.total_budget {
                    return Err(PoolError::SoldOut {
                        remaining: ledger.levels.available,
                    });
                }
            }

            notified.await;
        }
    }

    /// Close the pool and wake every waiter.
    ///
    /// Returns `true` if this call closed the pool, `false` if it was
    /// already closed. Counters are left as they were.
    pub fn close(&self) -> bool {
        {
            let mut ledger = self.lock();
            if ledger.closed {
                return false;
            }
            ledger.closed = true;
        }

        self.space_freed.notify_waiters();
        self.tickets_added.notify_waiters();
        self.closing.notify_waiters();
        true
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Resolve once the pool is closed. Returns immediately if it already is.
    pub async fn wait_closed(&self) {
        loop {
            let mut notified = pin!(self.closing.notified());
            notified.as_mut().enable();
            if self.is_closed() {
                return;
            }
            notified.await;
        }
    }

    /// Copy the current counters.
    pub fn levels(&self) -> PoolLevels {
        self.lock().levels
    }

    /// Tickets that may still be released before the budget is exhausted.
    pub fn remaining_budget(&self) -> u32 {
        self.total_budget.saturating_sub(self.lock().levels.produced)
    }

    /// Whether every budgeted ticket has been released and retrieved.
    pub fn is_sold_out(&self) -> bool {
        let levels = self.levels();
        levels.produced >= self.total_budget && levels.available == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn produce_then_consume_moves_counters_together() {
        let pool = TicketPool::new(5, 10);

        let levels = pool.produce(3).await.unwrap();
        assert_eq!(
            levels,
            PoolLevels {
                available: 3,
                produced: 3,
                consumed: 0
            }
        );

        let levels = pool.consume(2).await.unwrap();
        assert_eq!(
            levels,
            PoolLevels {
                available: 1,
                produced: 3,
                consumed: 2
            }
        );
        assert_eq!(pool.remaining_budget(), 7);
    }

    #[tokio::test]
    async fn zero_and_oversized_amounts_fail_fast() {
        let pool = TicketPool::new(2, 10);
        assert_eq!(pool.produce(0).await, Err(PoolError::ZeroAmount));
        assert_eq!(pool.consume(0).await, Err(PoolError::ZeroAmount));
        assert_eq!(
            pool.produce(3).await,
            Err(PoolError::ExceedsCapacity {
                amount: 3,
                capacity: 2
            })
        );
        assert_eq!(pool.levels(), PoolLevels::default());
    }

    #[tokio::test]
    async fn budget_exhaustion_is_terminal_and_leaves_counters_alone() {
        let pool = TicketPool::new(10, 3);
        pool.produce(2).await.unwrap();

        let err = pool.produce(2).await.unwrap_err();
        assert_eq!(
            err,
            PoolError::BudgetExhausted {
                produced: 2,
                total_budget: 3
            }
        );

        pool.produce(1).await.unwrap();
        assert_eq!(pool.levels().produced, 3);
        assert_eq!(pool.remaining_budget(), 0);
    }

    #[tokio::test]
    async fn full_pool_blocks_producer_until_space_frees() {
        let pool = Arc::new(TicketPool::new(2, 10));
        pool.produce(2).await.unwrap();

        let producer = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.produce(1).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!producer.is_finished());
        assert_eq!(pool.levels().available, 2);

        pool.consume(1).await.unwrap();
        let levels = producer.await.unwrap().unwrap();
        assert_eq!(levels.available, 2);
        assert_eq!(levels.produced, 3);
    }

    #[tokio::test]
    async fn empty_pool_blocks_consumer_until_supply_arrives() {
        let pool = Arc::new(TicketPool::new(2, 10));

        let consumer = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.consume(1).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!consumer.is_finished());

        pool.produce(1).await.unwrap();
        let levels = consumer.await.unwrap().unwrap();
        assert_eq!(levels.available, 0);
        assert_eq!(levels.consumed, 1);
    }

    #[tokio::test]
    async fn close_unblocks_waiters_with_cancelled() {
        let pool = Arc::new(TicketPool::new(1, 10));
        pool.produce(1).await.unwrap();

        let blocked_producer = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.produce(1).await })
        };
        let empty = Arc::new(TicketPool::new(1, 10));
        let blocked_consumer = {
            let empty = Arc::clone(&empty);
            tokio::spawn(async move { empty.consume(1).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(pool.close());
        assert!(empty.close());

        assert_eq!(blocked_producer.await.unwrap(), Err(PoolError::Cancelled));
        assert_eq!(blocked_consumer.await.unwrap(), Err(PoolError::Cancelled));
        assert_eq!(pool.levels().available, 1);
    }

    #[tokio::test]
    async fn close_is_idempotent_and_rejects_new_work() {
        let pool = TicketPool::new(3, 3);
        assert!(pool.close());
        assert!(!pool.close());
        assert!(pool.is_closed());
        assert_eq!(pool.produce(1).await, Err(PoolError::Cancelled));
        assert_eq!(pool.consume(1).await, Err(PoolError::Cancelled));
    }

    #[tokio::test]
    async fn wait_closed_resolves_on_close() {
        let pool = Arc::new(TicketPool::new(1, 1));
        let waiter = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.wait_closed().await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());
        pool.close();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();

        // Already closed: resolves immediately.
        pool.wait_closed().await;
    }

    #[tokio::test]
    async fn consumer_is_released_once_everything_is_sold() {
        let pool = Arc::new(TicketPool::new(5, 2));

        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let pool = Arc::clone(&pool);
                tokio::spawn(async move { pool.consume(1).await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(10)).await;
        pool.produce(2).await.unwrap();

        let mut sold = 0;
        let mut sold_out = 0;
        for handle in consumers {
            match handle.await.unwrap() {
                Ok(_) => sold += 1,
                Err(PoolError::SoldOut { remaining: 0 }) => sold_out += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(sold, 2);
        assert_eq!(sold_out, 1);
        assert!(pool.is_sold_out());
    }

    #[tokio::test]
    async fn sold_out_reports_leftover_tickets() {
        let pool = TicketPool::new(5, 3);
        pool.produce(3).await.unwrap();
        assert_eq!(pool.consume(4).await, Err(PoolError::SoldOut { remaining: 3 }));
        assert!(!pool.is_sold_out());
        pool.consume(3).await.unwrap();
        assert!(pool.is_sold_out());
    }
}
