//! Runtime-adjustable worker rates.
//!
//! Vendors and customers read their pacing interval from a shared
//! [`RateCell`] before every sleep, so a rate change made through the control
//! API applies from the next cycle without restarting the run. Both rates are
//! plain atomics; a torn read between the two is harmless because each
//! worker only ever reads its own role's rate.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use ticketing_types::WorkerRole;

/// Release and retrieval rates in tickets per second per worker.
#[derive(Debug)]
pub struct RateCell {
    release_rate: AtomicU32,
    retrieval_rate: AtomicU32,
}

impl RateCell {
    /// Create a cell with the given starting rates.
    pub const fn new(release_rate: u32, retrieval_rate: u32) -> Self {
        Self {
            release_rate: AtomicU32::new(release_rate),
            retrieval_rate: AtomicU32::new(retrieval_rate),
        }
    }

    /// Current per-vendor release rate.
    pub fn release_rate(&self) -> u32 {
        self.release_rate.load(Ordering::Acquire)
    }

    /// Current per-customer retrieval rate.
    pub fn retrieval_rate(&self) -> u32 {
        self.retrieval_rate.load(Ordering::Acquire)
    }

    /// Set the release rate. Must be at least 1.
    ///
    /// Returns the previous rate on success, or `None` if the value was
    /// rejected.
    pub fn set_release_rate(&self, rate: u32) -> Option<u32> {
        if rate == 0 {
            return None;
        }
        Some(self.release_rate.swap(rate, Ordering::AcqRel))
    }

    /// Set the retrieval rate. Must be at least 1.
    ///
    /// Returns the previous rate on success, or `None` if the value was
    /// rejected.
    pub fn set_retrieval_rate(&self, rate: u32) -> Option<u32> {
        if rate == 0 {
            return None;
        }
        Some(self.retrieval_rate.swap(rate, Ordering::AcqRel))
    }

    /// Rate for the given role.
    pub fn rate_for(&self, role: WorkerRole) -> u32 {
        match role {
            WorkerRole::Vendor => self.release_rate(),
            WorkerRole::Customer => self.retrieval_rate(),
        }
    }

    /// Time between operations for the given role: `1 / rate` seconds.
    pub fn interval_for(&self, role: WorkerRole) -> Duration {
        rate_to_interval(self.rate_for(role))
    }
}

/// Convert tickets-per-second into the pause between single operations.
///
/// A rate of zero cannot be stored in a [`RateCell`]; it maps to one second
/// so the conversion stays total.
pub const fn rate_to_interval(rate: u32) -> Duration {
    match Duration::from_secs(1).checked_div(rate) {
        Some(interval) => interval,
        None => Duration::from_secs(1),
    }
}
