//! Metrics collection and exposition.
//!
//! # Metrics
//! - `unit_sentry_check_failures_total` (counter): failed checks by
//!   failure category (`dbus_error` vs `type_error`)
//! - `unit_sentry_unit_up` (gauge): 1 = monitored unit active, 0 = not
//! - `unit_sentry_checker_last_success_timestamp_seconds` (gauge): unix
//!   time of the last completed check cycle
//! - `unit_sentry_check_duration_seconds` (histogram): provider query
//!   latency
//! - `unit_sentry_requests_total` (counter): served requests by status
//! - `unit_sentry_rate_limited_total` (counter): requests refused with 429

use std::net::SocketAddr;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter started"),
        Err(e) => tracing::error!(error = %e, "Failed to start metrics exporter"),
    }
}

/// One failed check, labeled by failure category.
pub fn record_check_failure(category: &'static str) {
    counter!("unit_sentry_check_failures_total", "category" => category).increment(1);
}

/// Up/down gauge for the monitored unit.
pub fn record_unit_status(up: bool) {
    gauge!("unit_sentry_unit_up").set(if up { 1.0 } else { 0.0 });
}

/// Checker liveness heartbeat, independent of cache content.
pub fn record_checker_progress() {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();
    gauge!("unit_sentry_checker_last_success_timestamp_seconds").set(now);
}

/// Provider query latency.
pub fn record_check_duration(started: Instant) {
    histogram!("unit_sentry_check_duration_seconds").record(started.elapsed().as_secs_f64());
}

/// One served request.
pub fn record_request(status: u16) {
    counter!("unit_sentry_requests_total", "status" => status.to_string()).increment(1);
}

/// One request refused by the rate limiter.
pub fn record_rate_limited() {
    counter!("unit_sentry_rate_limited_total").increment(1);
}
