//! Shared status cache.
//!
//! # Data Flow
//! ```text
//! Poll loop (single writer):
//!     check result
//!     → update_status() (exclusive write, all fields replaced at once)
//!
//! Request handlers (many readers):
//!     status() / staleness() / cache_state()
//!     → shared read, never blocked longer than a memory copy
//! ```
//!
//! # Design Decisions
//! - RwLock: rare exclusive writes, frequent concurrent reads
//! - A reader can never observe fields from two different updates
//! - Before the first write, readers see a safe 503/"uninitialized" default
//! - The lifecycle state is derived from the latest write, never stored

use std::sync::RwLock;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Lifecycle classification of the cache contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// No check has completed yet.
    Uninitialized,
    /// The last check completed and produced a unit state.
    Running,
    /// The last check recorded a provider or data-shape fault.
    Error,
}

impl CacheState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheState::Uninitialized => "uninitialized",
            CacheState::Running => "running",
            CacheState::Error => "error",
        }
    }
}

/// One complete check outcome. Replaced wholesale on every update.
#[derive(Debug, Clone)]
struct CheckResult {
    status_code: u16,
    state: String,
    observed_at: Option<Instant>,
}

/// Last-known unit status, shared between the poll loop and request handlers.
pub struct StatusCache {
    inner: RwLock<CheckResult>,
}

impl StatusCache {
    /// Create a cache holding the pre-first-check default.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CheckResult {
                status_code: 503,
                state: "uninitialized".to_string(),
                observed_at: None,
            }),
        }
    }

    /// Replace the cached result. The observation timestamp is taken here,
    /// not supplied by the caller, so a normal update cannot be backdated.
    pub fn update_status(&self, status_code: u16, state: impl Into<String>) {
        let mut guard = self.inner.write().expect("status cache lock poisoned");
        *guard = CheckResult {
            status_code,
            state: state.into(),
            observed_at: Some(Instant::now()),
        };
    }

    /// Staleness-test seam: like `update_status` but with an explicit
    /// observation instant. Not part of the public surface.
    #[cfg(test)]
    fn update_status_at(&self, status_code: u16, state: impl Into<String>, observed_at: Instant) {
        let mut guard = self.inner.write().expect("status cache lock poisoned");
        *guard = CheckResult {
            status_code,
            state: state.into(),
            observed_at: Some(observed_at),
        };
    }

    /// Current `(status_code, state)` pair, always from a single update.
    pub fn status(&self) -> (u16, String) {
        let guard = self.inner.read().expect("status cache lock poisoned");
        (guard.status_code, guard.state.clone())
    }

    /// Instant of the most recent update, if any.
    pub fn last_checked(&self) -> Option<Instant> {
        let guard = self.inner.read().expect("status cache lock poisoned");
        guard.observed_at
    }

    /// Elapsed time since the last update. A cache that has never been
    /// written reports the maximum possible staleness.
    pub fn staleness(&self) -> Duration {
        match self.last_checked() {
            Some(at) => at.elapsed(),
            None => Duration::MAX,
        }
    }

    /// True when the cached result is older than `max_age`, or when no
    /// update has ever happened.
    pub fn is_stale(&self, max_age: Duration) -> bool {
        self.staleness() >= max_age
    }

    /// Lifecycle classification of the latest write.
    pub fn cache_state(&self) -> CacheState {
        let guard = self.inner.read().expect("status cache lock poisoned");
        if guard.observed_at.is_none() {
            CacheState::Uninitialized
        } else if guard.state == "error" || guard.state == "type_error" {
            CacheState::Error
        } else {
            CacheState::Running
        }
    }

    pub fn is_uninitialized(&self) -> bool {
        self.cache_state() == CacheState::Uninitialized
    }

    pub fn is_error(&self) -> bool {
        self.cache_state() == CacheState::Error
    }
}

impl Default for StatusCache {
    fn default() -> Self {
        Self::new()
    }
}
