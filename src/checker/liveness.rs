//! Checker liveness tracking.
//!
//! Answers "is the poll loop still making progress?" independently of
//! whether the monitored unit is healthy. A cycle that completes with an
//! error still counts as progress; a cycle that hangs does not.

use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Records the last instant the poll loop completed a cycle.
pub struct CheckerHealth {
    last_success: RwLock<Option<Instant>>,
}

impl CheckerHealth {
    pub fn new() -> Self {
        Self {
            last_success: RwLock::new(None),
        }
    }

    /// Called by the poll loop after every completed cycle, including a
    /// cycle that ends in a successfully verified reconnection.
    pub fn record_success(&self) {
        let mut guard = self
            .last_success
            .write()
            .expect("checker health lock poisoned");
        *guard = Some(Instant::now());
    }

    /// Best-effort snapshot: true iff a cycle completed within `max_age`.
    /// False if no cycle has ever completed.
    pub fn is_healthy(&self, max_age: Duration) -> bool {
        let guard = self
            .last_success
            .read()
            .expect("checker health lock poisoned");
        match *guard {
            Some(at) => at.elapsed() < max_age,
            None => false,
        }
    }

    /// Instant of the last completed cycle, if any.
    pub fn last_success(&self) -> Option<Instant> {
        *self
            .last_success
            .read()
            .expect("checker health lock poisoned")
    }
}

impl Default for CheckerHealth {
    fn default() -> Self {
        Self::new()
    }
}
