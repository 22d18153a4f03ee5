//! Unit-status provider boundary.
//!
//! # Data Flow
//! ```text
//! Poll loop:
//!     provider.connect()   → connection handle (repeatable during reconnect)
//!     connection.get_state(unit) → ActiveState string
//! ```
//!
//! # Design Decisions
//! - The poll loop only sees these traits; the transport is swappable
//! - Connection handles close on drop
//! - Errors split into connectivity faults and data-shape faults, because
//!   only the former justifies tearing down the connection

use async_trait::async_trait;
use thiserror::Error;

pub mod systemctl;

pub use systemctl::SystemctlProvider;

/// Faults surfaced by the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The bus was unreachable, the query transport failed, or the query
    /// timed out.
    #[error("provider connection error: {0}")]
    Connection(String),

    /// The provider answered, but not with a plain state string.
    #[error("unexpected reply shape: {0}")]
    UnexpectedShape(String),
}

impl ProviderError {
    /// Failure-category label emitted to metrics.
    pub fn category(&self) -> &'static str {
        match self {
            ProviderError::Connection(_) => "dbus_error",
            ProviderError::UnexpectedShape(_) => "type_error",
        }
    }

    /// State string written into the cache for this fault.
    pub fn cache_state(&self) -> &'static str {
        match self {
            ProviderError::Connection(_) => "error",
            ProviderError::UnexpectedShape(_) => "type_error",
        }
    }
}

/// Factory for unit-status connections.
#[async_trait]
pub trait UnitStatusProvider: Send + Sync {
    /// Establish a fresh connection. Called repeatedly during reconnection.
    async fn connect(&self) -> Result<Box<dyn UnitConnection>, ProviderError>;
}

/// An established connection to the unit-status provider.
#[async_trait]
pub trait UnitConnection: Send + Sync {
    /// Query the current lifecycle state of `unit` (e.g. "active").
    async fn get_state(&self, unit: &str) -> Result<String, ProviderError>;
}
