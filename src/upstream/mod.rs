//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! inbound Request<Body>
//!     → forwarder.rs (rewrite URI against the fixed upstream,
//!                     optionally re-embed the DATA parameter)
//!     → hyper legacy client
//!     → upstream response passed through unchanged
//! ```
//!
//! # Design Decisions
//! - One shared client; connections pool across requests
//! - No retries: a transport failure surfaces as a 502 at the edge
//! - Headers and body are passed through unmodified

pub mod forwarder;

pub use forwarder::{ForwardError, Forwarder};
