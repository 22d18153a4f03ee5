//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::AppConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate the full configuration, collecting every problem.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.monitor.unit.trim().is_empty() {
        errors.push(ValidationError {
            field: "monitor.unit",
            message: "a unit name is required".to_string(),
        });
    }

    if config.monitor.interval_secs == 0 {
        errors.push(ValidationError {
            field: "monitor.interval_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.monitor.query_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "monitor.query_timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.monitor.reconnect_initial_delay_secs == 0 {
        errors.push(ValidationError {
            field: "monitor.reconnect_initial_delay_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.monitor.reconnect_max_delay_secs < config.monitor.reconnect_initial_delay_secs {
        errors.push(ValidationError {
            field: "monitor.reconnect_max_delay_secs",
            message: "must be at least the initial delay".to_string(),
        });
    }

    if config.rate_limit.enabled {
        if config.rate_limit.requests_per_second <= 0.0 {
            errors.push(ValidationError {
                field: "rate_limit.requests_per_second",
                message: "must be greater than zero".to_string(),
            });
        }
        if config.rate_limit.burst_size == 0 {
            errors.push(ValidationError {
                field: "rate_limit.burst_size",
                message: "must be greater than zero".to_string(),
            });
        }
        if config.rate_limit.sweep_interval_secs == 0 {
            errors.push(ValidationError {
                field: "rate_limit.sweep_interval_secs",
                message: "must be greater than zero".to_string(),
            });
        }
    }

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("not a valid socket address: {}", config.listener.bind_address),
        });
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address",
            message: format!(
                "not a valid socket address: {}",
                config.observability.metrics_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
