//! Configuration validation.
//!
//! Semantic checks on top of what serde already guarantees syntactically.
//! Returns every violation found, not just the first, so a bad config can be
//! fixed in one pass.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic violation in the configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    BindAddress(String),

    #[error("upstream.address {0:?} is not a valid URL: {1}")]
    UpstreamAddress(String, String),

    #[error("upstream.address must use the http scheme, got {0:?}")]
    UpstreamScheme(String),

    #[error("upstream.address {0:?} has no host")]
    UpstreamHost(String),

    #[error("upstream.comm_path {0:?} must start with '/'")]
    CommPath(String),

    #[error("dedup.window_secs must be greater than zero")]
    DedupWindow,

    #[error("dedup.discard_types must not contain empty entries")]
    EmptyDiscardType,

    #[error("stats.interval_secs must be greater than zero")]
    StatsInterval,

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,

    #[error("observability.metrics_address {0:?} is not a valid socket address")]
    MetricsAddress(String),

    #[error("version_check.owner and version_check.repo are required when the check is enabled")]
    VersionCheckTarget,
}

/// Validate a parsed configuration, collecting every violation.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    match Url::parse(&config.upstream.address) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::UpstreamScheme(url.scheme().to_string()));
            }
            if url.host_str().is_none() {
                errors.push(ValidationError::UpstreamHost(
                    config.upstream.address.clone(),
                ));
            }
        }
        Err(e) => errors.push(ValidationError::UpstreamAddress(
            config.upstream.address.clone(),
            e.to_string(),
        )),
    }

    if !config.upstream.comm_path.starts_with('/') {
        errors.push(ValidationError::CommPath(config.upstream.comm_path.clone()));
    }

    if config.dedup.window_secs == 0 {
        errors.push(ValidationError::DedupWindow);
    }

    if config.dedup.discard_types.iter().any(String::is_empty) {
        errors.push(ValidationError::EmptyDiscardType);
    }

    if config.stats.enabled && config.stats.interval_secs == 0 {
        errors.push(ValidationError::StatsInterval);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.version_check.enabled
        && (config.version_check.owner.is_empty() || config.version_check.repo.is_empty())
    {
        errors.push(ValidationError::VersionCheckTarget);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
