//! Duplicate-suppression subsystem.
//!
//! # Data Flow
//! ```text
//! DATA query parameter (base64)
//!     → record.rs (decode into a GameRecord)
//!     → admission.rs (FORWARD or DROP against the last-seen cache)
//!     → counters.rs (total / dropped bookkeeping)
//! ```
//!
//! # Design Decisions
//! - Cache entries expire lazily: staleness is evaluated on read, no sweeper
//! - Check-then-write on a cache key happens under that key's entry lock
//! - Counters live for the process lifetime; restart resets them to zero

pub mod admission;
pub mod counters;
pub mod record;

pub use admission::{AdmissionFilter, Decision};
pub use counters::CounterStore;
pub use record::{decode, DecodeError, GameRecord};
