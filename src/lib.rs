//! Deduplicating telemetry proxy.
//!
//! Sits in front of a single fixed upstream HTTP endpoint and suppresses
//! duplicate telemetry records before they reach it, forwarding everything
//! else untouched.
//!
//! ```text
//!                    ┌────────┐    ┌─────────┐    ┌────────────┐
//!   GET ?DATA=…  ───▶│  http  │───▶│  dedup  │───▶│  upstream  │───▶ Upstream
//!                    │ server │    │ filter  │    │ forwarder  │
//!   200 (empty)  ◀───│        │◀───│  DROP   │    └────────────┘
//!                    └────────┘    └─────────┘
//!
//!   Cross-cutting: config · stats · lifecycle · observability · version
//! ```
//!
//! All other traffic on the route space (non-GET methods, other paths,
//! undecodable payloads) bypasses the filter and is forwarded unconditionally.

// Core subsystems
pub mod config;
pub mod dedup;
pub mod http;
pub mod upstream;

// Background tasks
pub mod stats;
pub mod version;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
