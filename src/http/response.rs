//! Response body shapes.

use serde::Serialize;

use crate::cache::CacheState;

/// Body served by `GET /status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Monitored unit name.
    pub unit: String,
    /// HTTP-style status code derived from the unit state.
    pub status_code: u16,
    /// Raw unit state from the last check ("active", "error", ...).
    pub state: String,
    /// Lifecycle classification of the cached result.
    pub cache_state: CacheState,
    /// Age of the cached result in seconds; absent before the first check.
    pub last_checked_seconds_ago: Option<f64>,
    /// True when the cached result is older than the staleness threshold.
    pub stale: bool,
}

/// Body served by `GET /healthz`: checker liveness, not unit health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// True when the poll loop completed a cycle recently.
    pub healthy: bool,
    /// Seconds since the last completed cycle; absent before the first.
    pub last_check_seconds_ago: Option<f64>,
}
