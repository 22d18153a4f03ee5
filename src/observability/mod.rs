//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Poll loop / HTTP layer produce:
//!     → metrics.rs (counters, gauges, histograms)
//!     → tracing events (initialized in main)
//!
//! Consumers:
//!     → Prometheus scrape of the exporter endpoint
//!     → Log aggregation (stdout)
//! ```
//!
//! # Design Decisions
//! - The core only emits; it never reads metrics back
//! - Metric updates are cheap (atomic operations in the recorder)

pub mod metrics;
