//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → client_key.rs (derive client identity from headers/address)
//!     → rate_limit.rs (token-bucket admission check)
//!     → Pass to handlers, or 429
//! ```
//!
//! # Design Decisions
//! - The limiter only answers questions; the 429 decision and its headers
//!   belong to the HTTP layer
//! - Key derivation order is fixed everywhere a key is derived, so a
//!   client cannot escape limiting by dropping a header

pub mod client_key;
pub mod rate_limit;

pub use client_key::client_key;
pub use rate_limit::{RateLimiter, RateLimiterStats};
