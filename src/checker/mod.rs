//! Unit checking subsystem.
//!
//! # Data Flow
//! ```text
//! Poll loop (poller.rs):
//!     Immediate startup check, then fixed-interval ticks
//!     → query provider (bounded timeout)
//!     → map ActiveState to status code (mapping.rs)
//!     → write StatusCache, record progress (liveness.rs)
//!     → on connectivity fault: reconnect with doubling backoff
//!
//! Liveness tracker (liveness.rs):
//!     Every completed cycle → record_success()
//!     Watchdog → is_healthy(max_age)
//! ```
//!
//! # Design Decisions
//! - Checker liveness is tracked separately from unit health: a down unit
//!   still advances the tracker, a hung checker does not
//! - The per-query timeout is what makes a hung checker impossible under
//!   normal operation
//! - The loop only ever exits on the shutdown signal, never on failures

pub mod liveness;
pub mod mapping;
pub mod poller;

pub use liveness::CheckerHealth;
pub use poller::StatusPoller;
