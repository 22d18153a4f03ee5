//! unit-sentry service binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────┐
//!                  │                 UNIT SENTRY                   │
//!                  │                                               │
//!   systemd unit   │  ┌──────────┐   ┌─────────┐   ┌───────────┐  │
//!   ───────────────┼─▶│ provider │──▶│ checker │──▶│  status   │  │
//!   (ActiveState)  │  │ (D-Bus)  │   │ poller  │   │  cache    │  │
//!                  │  └──────────┘   └────┬────┘   └─────┬─────┘  │
//!                  │                      │              │        │
//!                  │                      ▼              ▼        │
//!   Client ────────┼─▶ rate limit ──▶ HTTP handlers ──▶ JSON ─────┼──▶
//!   request        │   middleware      /status /healthz           │
//!                  │                                               │
//!                  │  ┌─────────────────────────────────────────┐  │
//!                  │  │          Cross-Cutting Concerns          │  │
//!                  │  │  config │ observability │ lifecycle      │  │
//!                  │  └─────────────────────────────────────────┘  │
//!                  └──────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use unit_sentry::cache::StatusCache;
use unit_sentry::checker::{CheckerHealth, StatusPoller};
use unit_sentry::config::{loader::load_config, AppConfig};
use unit_sentry::http::HttpServer;
use unit_sentry::lifecycle::{signals, Shutdown};
use unit_sentry::observability::metrics;
use unit_sentry::provider::SystemctlProvider;
use unit_sentry::security::RateLimiter;

#[derive(Parser, Debug)]
#[command(name = "unit-sentry", about = "Liveness monitor for a systemd unit")]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Unit to monitor; overrides the config file.
    #[arg(long)]
    unit: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "unit_sentry=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("unit-sentry v{} starting", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(unit) = args.unit {
        config.monitor.unit = unit;
    }
    if config.monitor.unit.is_empty() {
        return Err("no unit to monitor: pass --unit or set monitor.unit in the config".into());
    }

    tracing::info!(
        unit = %config.monitor.unit,
        bind_address = %config.listener.bind_address,
        interval_secs = config.monitor.interval_secs,
        rate_limit_enabled = config.rate_limit.enabled,
        "Configuration loaded"
    );

    // Metrics exporter
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // A unit systemd has never heard of is a fatal startup error; every
    // later fault is recovered by the poll loop.
    let provider = SystemctlProvider::new();
    provider.verify_unit_exists(&config.monitor.unit).await?;

    let config = Arc::new(config);
    let cache = Arc::new(StatusCache::new());
    let checker = Arc::new(CheckerHealth::new());
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit.requests_per_second,
        config.rate_limit.burst_size,
    ));

    let shutdown = Shutdown::new();

    // Poll loop
    let poller = StatusPoller::new(
        provider,
        cache.clone(),
        checker.clone(),
        config.monitor.clone(),
    );
    let poller_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        poller.run(poller_shutdown).await;
    });

    // Idle-bucket sweep
    if config.rate_limit.enabled {
        let sweep_limiter = limiter.clone();
        let sweep_interval = config.rate_limit.sweep_interval();
        let idle_threshold = config.rate_limit.idle_threshold();
        let sweep_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            sweep_limiter
                .run_sweep(sweep_interval, idle_threshold, sweep_shutdown)
                .await;
        });
    }

    // Signal handler: one broadcast stops the poller, the sweep, and the
    // HTTP drain together, so no new cache write races the final reads.
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        tracing::info!("Shutdown signal received");
        shutdown.trigger();
    });

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, cache, checker, limiter);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
