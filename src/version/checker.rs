//! Release listing lookup and version comparison.

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("comm-proxy/", env!("CARGO_PKG_VERSION"));

/// Errors raised while checking for a newer release.
#[derive(Debug, Error)]
pub enum VersionCheckError {
    #[error("release listing request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed release listing: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("could not parse version {0:?}")]
    Version(String),
}

/// Latest release as returned by the listing API.
#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
}

/// Outcome of a successful check.
#[derive(Debug, Clone)]
pub struct UpdateStatus {
    /// Latest published version, prefix and build metadata stripped.
    pub latest: String,
    /// Whether the latest release is newer than the running build.
    pub update_available: bool,
}

/// Client for the remote release listing.
pub struct UpdateChecker {
    http: reqwest::Client,
    api_base: String,
}

impl UpdateChecker {
    /// Create a checker against the default API host.
    pub fn new() -> Self {
        Self::with_api_base(DEFAULT_API_BASE)
    }

    /// Create a checker against a specific API host.
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        // The GitHub API rejects requests without a User-Agent header.
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            api_base: api_base.into(),
        }
    }

    /// Fetch the latest release tag and compare it against `current`.
    pub async fn check(
        &self,
        owner: &str,
        repo: &str,
        current: &str,
    ) -> Result<UpdateStatus, VersionCheckError> {
        let url = format!("{}/repos/{}/{}/releases/latest", self.api_base, owner, repo);

        let body = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let release: LatestRelease = serde_json::from_slice(&body)?;

        let current_triple = semver_triple(current)
            .ok_or_else(|| VersionCheckError::Version(current.to_string()))?;
        let latest_triple = semver_triple(&release.tag_name)
            .ok_or_else(|| VersionCheckError::Version(release.tag_name.clone()))?;

        Ok(UpdateStatus {
            latest: format_triple(latest_triple),
            update_available: latest_triple > current_triple,
        })
    }
}

impl Default for UpdateChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a version string into its `(major, minor, patch)` triple.
///
/// Leading prefix letters ("v1.0.2") and build metadata after a `+`
/// ("1.0.2+8a5fe55") are ignored.
fn semver_triple(version: &str) -> Option<(u64, u64, u64)> {
    let version = version.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let version = version.split('+').next()?;

    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    let patch = parts.next()?.parse().ok()?;

    Some((major, minor, patch))
}

fn format_triple((major, minor, patch): (u64, u64, u64)) -> String {
    format!("{major}.{minor}.{patch}")
}

/// Run the startup check and print the banner.
///
/// Failures are logged at warn level; serving is never affected.
pub async fn report_update_status(checker: &UpdateChecker, owner: &str, repo: &str) {
    let current = env!("CARGO_PKG_VERSION");

    match checker.check(owner, repo, current).await {
        Ok(status) if status.update_available => {
            tracing::info!(
                "a newer release {} is available (running {})",
                status.latest,
                current
            );
        }
        Ok(status) => {
            tracing::info!(
                "running the latest release ({}, latest published {})",
                current,
                status.latest
            );
        }
        Err(error) => {
            tracing::warn!(%error, "version check failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_triples() {
        assert_eq!(semver_triple("1.0.2"), Some((1, 0, 2)));
        assert_eq!(semver_triple("10.20.30"), Some((10, 20, 30)));
    }

    #[test]
    fn strips_prefix_letters_and_build_metadata() {
        assert_eq!(semver_triple("v1.0.2"), Some((1, 0, 2)));
        assert_eq!(semver_triple("1.0.2+8a5fe5567f"), Some((1, 0, 2)));
        assert_eq!(semver_triple("v2.1.0+build.5"), Some((2, 1, 0)));
    }

    #[test]
    fn rejects_incomplete_versions() {
        assert_eq!(semver_triple("1.0"), None);
        assert_eq!(semver_triple(""), None);
        assert_eq!(semver_triple("not-a-version"), None);
    }

    #[test]
    fn comparison_uses_three_level_precedence() {
        let newer = |a: &str, b: &str| semver_triple(b).unwrap() > semver_triple(a).unwrap();

        assert!(newer("1.0.2", "2.0.0"));
        assert!(newer("1.0.2", "1.1.0"));
        assert!(newer("1.0.2", "1.0.3"));
        assert!(!newer("1.0.2", "1.0.2"));
        assert!(!newer("2.0.0", "1.9.9"));
        // Patch never outranks minor, minor never outranks major.
        assert!(!newer("1.2.0", "1.1.9"));
        assert!(newer("1.9.9", "2.0.0"));
    }
}
