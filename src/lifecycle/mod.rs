//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger()
//!
//! Shutdown (shutdown.rs):
//!     broadcast → poll loop exits, dropping its connection
//!              → rate limiter sweep exits at its own pace
//!              → HTTP server drains and stops
//! ```
//!
//! # Design Decisions
//! - One broadcast channel; every long-running task subscribes
//! - The poll loop is signaled with (not after) the HTTP layer, so no new
//!   cache write races the final reads during drain

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
