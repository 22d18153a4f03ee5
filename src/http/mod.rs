//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, handlers)
//!     → rate limit middleware (security subsystem)
//!     → handlers read StatusCache / CheckerHealth
//!     → response.rs (JSON body shapes)
//! ```

pub mod response;
pub mod server;

pub use server::{AppState, HttpServer};
