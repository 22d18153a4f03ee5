//! unit-sentry: liveness monitor for a systemd unit.
//!
//! Polls the unit's ActiveState on a fixed interval, caches the translated
//! result for high-volume reads, and rate-limits abusive clients of the
//! status endpoint.

pub mod cache;
pub mod checker;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod provider;
pub mod resilience;
pub mod security;

pub use cache::{CacheState, StatusCache};
pub use checker::{CheckerHealth, StatusPoller};
pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use security::RateLimiter;
