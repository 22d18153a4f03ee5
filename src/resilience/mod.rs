//! Resilience primitives.
//!
//! # Design Decisions
//! - Every provider query has a deadline; a hung query becomes a
//!   connectivity fault, never a hung checker
//! - Reconnection backs off with a fixed doubling ladder so recovery
//!   pressure on the provider is bounded

pub mod backoff;

pub use backoff::RetryDelay;
