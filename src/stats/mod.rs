//! Background stats reporting.
//!
//! # Design Decisions
//! - Runs on its own task, never on the request path
//! - Counter reads cannot fail, so a tick cannot kill the loop
//! - Cancellation via the shutdown broadcast, observed within one interval

pub mod reporter;

pub use reporter::StatsReporter;
