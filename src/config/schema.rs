//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the telemetry proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single fixed upstream all traffic is forwarded to.
    pub upstream: UpstreamConfig,

    /// Duplicate-suppression settings.
    pub dedup: DedupConfig,

    /// Background stats reporter settings.
    pub stats: StatsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Startup release-listing check.
    pub version_check: VersionCheckConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5154").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5154".to_string(),
        }
    }
}

/// Upstream target configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream base address (e.g., "http://127.0.0.1:8081").
    pub address: String,

    /// Path of the telemetry endpoint carrying the `DATA` parameter.
    pub comm_path: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8081".to_string(),
            comm_path: "/server/comm.php".to_string(),
        }
    }
}

/// Duplicate-suppression configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Record types eligible for duplicate suppression.
    pub discard_types: Vec<String>,

    /// Seconds a cached payload stays live for suppression purposes.
    pub window_secs: u64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            discard_types: vec!["infonpc".to_string()],
            window_secs: 10,
        }
    }
}

/// Stats reporter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Enable the background stats reporter.
    pub enabled: bool,

    /// Seconds between summary lines.
    pub interval_secs: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 10,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Startup version check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VersionCheckConfig {
    /// Enable the startup check against the release listing.
    pub enabled: bool,

    /// Repository owner on the release-listing host.
    pub owner: String,

    /// Repository name.
    pub repo: String,
}

impl Default for VersionCheckConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            owner: String::new(),
            repo: String::new(),
        }
    }
}
