//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! service. All types derive Serde traits for deserialization from config
//! files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the unit monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Monitored unit and polling behavior.
    pub monitor: MonitorConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Polling configuration for the monitored unit.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Name of the systemd unit to watch (e.g., "nginx.service").
    pub unit: String,

    /// Seconds between checks.
    pub interval_secs: u64,

    /// Deadline for a single provider query, in seconds.
    pub query_timeout_secs: u64,

    /// Age at which the served result is flagged stale, in seconds.
    pub staleness_threshold_secs: u64,

    /// First reconnect delay, in seconds. Doubles per failed attempt.
    pub reconnect_initial_delay_secs: u64,

    /// Ceiling for the reconnect delay, in seconds.
    pub reconnect_max_delay_secs: u64,

    /// Age at which the checker itself is reported unhealthy, in seconds.
    pub checker_max_age_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            unit: String::new(),
            interval_secs: 10,
            query_timeout_secs: 5,
            staleness_threshold_secs: 30,
            reconnect_initial_delay_secs: 1,
            reconnect_max_delay_secs: 30,
            checker_max_age_secs: 30,
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn staleness_threshold(&self) -> Duration {
        Duration::from_secs(self.staleness_threshold_secs)
    }

    pub fn reconnect_initial_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_initial_delay_secs)
    }

    pub fn reconnect_max_delay(&self) -> Duration {
        Duration::from_secs(self.reconnect_max_delay_secs)
    }

    pub fn checker_max_age(&self) -> Duration {
        Duration::from_secs(self.checker_max_age_secs)
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable per-client rate limiting.
    pub enabled: bool,

    /// Sustained refill rate, tokens per second.
    pub requests_per_second: f64,

    /// Bucket capacity; also the initial token count.
    pub burst_size: u32,

    /// Seconds between idle-bucket sweeps.
    pub sweep_interval_secs: u64,

    /// Seconds of inactivity after which a bucket is evicted.
    pub idle_threshold_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 5.0,
            burst_size: 10,
            sweep_interval_secs: 300,
            idle_threshold_secs: 600,
        }
    }
}

impl RateLimitConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_threshold_secs)
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics exporter.
    pub metrics_enabled: bool,

    /// Metrics exporter bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            metrics_address: "127.0.0.1:9100".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_numeric_policy() {
        let config = MonitorConfig::default();
        assert_eq!(config.interval(), Duration::from_secs(10));
        assert_eq!(config.query_timeout(), Duration::from_secs(5));
        assert_eq!(config.staleness_threshold(), Duration::from_secs(30));
        assert_eq!(config.reconnect_initial_delay(), Duration::from_secs(1));
        assert_eq!(config.reconnect_max_delay(), Duration::from_secs(30));
    }

    #[test]
    fn minimal_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [monitor]
            unit = "nginx.service"
            "#,
        )
        .unwrap();
        assert_eq!(config.monitor.unit, "nginx.service");
        assert_eq!(config.monitor.interval_secs, 10);
        assert!(config.rate_limit.enabled);
        assert_eq!(config.rate_limit.burst_size, 10);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn sweep_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
        assert_eq!(config.idle_threshold(), Duration::from_secs(600));
    }
}
