//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms via the metrics facade)
//!
//! Consumers:
//!     → stdout (tracing fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! The metrics here are supplementary exposition; the dedup counter store
//! remains the source of truth for the periodic stats line.

pub mod logging;
pub mod metrics;
