//! systemd-backed provider using `systemctl`.
//!
//! `systemctl show` answers over systemd's D-Bus API, so transport failures
//! here are bus failures (hence the `dbus_error` failure category).

use async_trait::async_trait;
use tokio::process::Command;

use super::{ProviderError, UnitConnection, UnitStatusProvider};

/// Provider that shells out to `systemctl` for unit state.
#[derive(Debug, Clone, Default)]
pub struct SystemctlProvider;

impl SystemctlProvider {
    pub fn new() -> Self {
        Self
    }

    /// Startup existence check. A monitored unit that systemd has never
    /// heard of is the one fatal configuration error.
    pub async fn verify_unit_exists(&self, unit: &str) -> Result<(), ProviderError> {
        let load_state = show_property(Some(unit), "LoadState").await?;
        if load_state == "not-found" {
            return Err(ProviderError::Connection(format!(
                "unit {} not found by systemd",
                unit
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl UnitStatusProvider for SystemctlProvider {
    async fn connect(&self) -> Result<Box<dyn UnitConnection>, ProviderError> {
        // Probing the manager verifies the bus is answering before we hand
        // out a connection handle.
        show_property(None, "Version").await?;
        Ok(Box::new(SystemctlConnection))
    }
}

struct SystemctlConnection;

#[async_trait]
impl UnitConnection for SystemctlConnection {
    async fn get_state(&self, unit: &str) -> Result<String, ProviderError> {
        show_property(Some(unit), "ActiveState").await
    }
}

/// Run `systemctl show [unit] --property=<name> --value` and return the
/// trimmed reply.
async fn show_property(unit: Option<&str>, property: &str) -> Result<String, ProviderError> {
    let mut cmd = Command::new("systemctl");
    cmd.arg("show");
    if let Some(unit) = unit {
        cmd.arg(unit);
    }
    cmd.arg(format!("--property={}", property)).arg("--value");

    let output = cmd
        .output()
        .await
        .map_err(|e| ProviderError::Connection(format!("failed to run systemctl: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProviderError::Connection(format!(
            "systemctl show exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let value = String::from_utf8(output.stdout)
        .map_err(|_| ProviderError::UnexpectedShape("reply is not valid UTF-8".to_string()))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(ProviderError::UnexpectedShape(format!(
            "empty value for property {}",
            property
        )));
    }
    Ok(value.to_string())
}
