//! Startup release check.
//!
//! Compares the running build's version against the latest tag published on
//! the release-listing API and prints an informational banner. Runs as a
//! spawned task; any failure is logged and never affects serving.

pub mod checker;

pub use checker::{report_update_status, UpdateChecker, UpdateStatus, VersionCheckError};
