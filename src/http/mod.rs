//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, routing, middleware)
//!     → comm route: decode DATA → admission filter → drop or forward
//!     → any other route/method: forward unconditionally
//! ```

pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{AppState, HttpServer};

/// Query parameter carrying the encoded telemetry record.
pub const DATA_PARAM: &str = "DATA";
