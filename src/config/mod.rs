//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults so a missing file or empty table still works
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::DedupConfig;
pub use schema::ListenerConfig;
pub use schema::ProxyConfig;
pub use schema::StatsConfig;
pub use schema::TimeoutConfig;
pub use schema::UpstreamConfig;
pub use schema::VersionCheckConfig;
