//! Reconnection delay ladder.

use std::time::Duration;

/// Doubling retry delay with a ceiling. No jitter: the ladder
/// (1s, 2s, 4s, ... capped at 30s) is part of the reconnect contract.
#[derive(Debug, Clone)]
pub struct RetryDelay {
    current: Duration,
    initial: Duration,
    max: Duration,
}

impl RetryDelay {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            current: initial,
            initial,
            max,
        }
    }

    /// Delay to wait before the next attempt.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Double the delay, capped at the ceiling.
    pub fn advance(&mut self) {
        self.current = (self.current * 2).min(self.max);
    }

    /// Back to the initial delay, for use after a verified recovery.
    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}
