//! Reconnecting poll loop.
//!
//! # Responsibilities
//! - Periodically query the unit-status provider
//! - Translate the reported state into an HTTP-style status code
//! - Keep the status cache and liveness tracker current
//! - Recover autonomously from connectivity loss

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::broadcast;
use tokio::time::{self, timeout};

use crate::cache::StatusCache;
use crate::checker::liveness::CheckerHealth;
use crate::checker::mapping;
use crate::config::MonitorConfig;
use crate::observability::metrics;
use crate::provider::{ProviderError, UnitConnection, UnitStatusProvider};
use crate::resilience::RetryDelay;

/// What a single check cycle did to the connection.
enum CycleOutcome {
    /// The cycle completed, possibly recording an error result.
    Completed,
    /// The query transport failed; the connection must be replaced.
    ConnectionLost,
}

/// Drives the status cache from the unit-status provider.
pub struct StatusPoller<P: UnitStatusProvider> {
    provider: P,
    cache: Arc<StatusCache>,
    health: Arc<CheckerHealth>,
    config: MonitorConfig,
}

impl<P: UnitStatusProvider> StatusPoller<P> {
    pub fn new(
        provider: P,
        cache: Arc<StatusCache>,
        health: Arc<CheckerHealth>,
        config: MonitorConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            health,
            config,
        }
    }

    /// Run until the shutdown signal fires. Never exits on check failures.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            unit = %self.config.unit,
            interval_secs = self.config.interval_secs,
            "Status poller starting"
        );

        // Immediate first check so the cache is populated without waiting
        // out a full interval.
        let mut conn = match self.establish(&mut shutdown).await {
            Some(c) => c,
            None => return,
        };

        if let CycleOutcome::ConnectionLost = self.run_cycle(&*conn).await {
            drop(conn);
            match self.reconnect(&mut shutdown).await {
                Some(c) => conn = c,
                None => return,
            }
        }

        let mut ticker = time::interval(self.config.interval());
        ticker.tick().await; // the first tick completes immediately

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let CycleOutcome::ConnectionLost = self.run_cycle(&*conn).await {
                        drop(conn);
                        match self.reconnect(&mut shutdown).await {
                            Some(c) => conn = c,
                            None => return,
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Status poller received shutdown signal, exiting loop");
                    break;
                }
            }
        }
        // Dropping the connection on the way out closes it.
    }

    /// Initial connection. Falls into the reconnect loop if the very first
    /// attempt fails, so startup behaves like any other outage.
    async fn establish(
        &self,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Option<Box<dyn UnitConnection>> {
        match self.provider.connect().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                tracing::warn!(error = %e, "Initial provider connection failed");
                self.record_failure(&e);
                self.reconnect(shutdown).await
            }
        }
    }

    /// One complete check cycle against an established connection.
    async fn run_cycle(&self, conn: &dyn UnitConnection) -> CycleOutcome {
        let started = Instant::now();
        let result = self.query(conn).await;
        metrics::record_check_duration(started);

        match result {
            Ok(state) => {
                let code = match mapping::status_code_for(&state) {
                    Some(code) => code,
                    None => {
                        tracing::warn!(
                            unit = %self.config.unit,
                            state = %state,
                            "Unrecognized unit state, reporting as error"
                        );
                        mapping::UNKNOWN_STATE_CODE
                    }
                };
                let up = state == "active";
                self.cache.update_status(code, state);
                metrics::record_unit_status(up);
                self.mark_progress();
                CycleOutcome::Completed
            }
            Err(e @ ProviderError::UnexpectedShape(_)) => {
                // A malformed reply is still a completed cycle; the
                // transport answered, so the connection survives.
                tracing::warn!(unit = %self.config.unit, error = %e, "Check returned unexpected data shape");
                self.record_failure(&e);
                self.mark_progress();
                CycleOutcome::Completed
            }
            Err(e) => {
                tracing::warn!(unit = %self.config.unit, error = %e, "Check failed, reconnecting");
                self.record_failure(&e);
                CycleOutcome::ConnectionLost
            }
        }
    }

    /// Bounded-deadline provider query. A timeout is a connectivity fault.
    async fn query(&self, conn: &dyn UnitConnection) -> Result<String, ProviderError> {
        match timeout(self.config.query_timeout(), conn.get_state(&self.config.unit)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Connection(format!(
                "query timed out after {}s",
                self.config.query_timeout_secs
            ))),
        }
    }

    /// Reconnect with a doubling delay ladder. Returns `None` only when the
    /// shutdown signal fires.
    async fn reconnect(
        &self,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Option<Box<dyn UnitConnection>> {
        let mut delay = RetryDelay::new(
            self.config.reconnect_initial_delay(),
            self.config.reconnect_max_delay(),
        );
        let mut attempt: u32 = 0;

        loop {
            // Bail immediately if shutdown was already signaled.
            match shutdown.try_recv() {
                Err(broadcast::error::TryRecvError::Empty) => {}
                _ => {
                    tracing::info!("Shutdown during reconnect, abandoning");
                    return None;
                }
            }

            attempt += 1;
            match self.provider.connect().await {
                Ok(conn) => {
                    // Verify with one real cycle before trusting the
                    // connection; a completed cycle counts as progress.
                    match self.run_cycle(&*conn).await {
                        CycleOutcome::Completed => {
                            tracing::info!(attempt, "Provider connection re-established");
                            return Some(conn);
                        }
                        CycleOutcome::ConnectionLost => {
                            tracing::warn!(attempt, "Reconnect verification query failed");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        error = %e,
                        delay_secs = delay.current().as_secs(),
                        "Reconnect attempt failed"
                    );
                }
            }

            // Wait out the backoff, interruptibly.
            tokio::select! {
                _ = time::sleep(delay.current()) => delay.advance(),
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown during reconnect backoff, abandoning");
                    return None;
                }
            }
        }
    }

    /// Write a fault into the cache and emit the matching failure metrics.
    fn record_failure(&self, error: &ProviderError) {
        self.cache
            .update_status(mapping::UNKNOWN_STATE_CODE, error.cache_state());
        metrics::record_check_failure(error.category());
        metrics::record_unit_status(false);
    }

    /// A cycle completed; the checker itself is alive.
    fn mark_progress(&self) {
        self.health.record_success();
        metrics::record_checker_progress();
    }
}
