//! Version checking against the latest release on the package index.

use anyhow::Context;
use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Result, SetupError};
use crate::requirements::parse_version;

/// User agent sent to the package index.
pub const USER_AGENT: &str = "wrkmon-setup";

/// Request timeout for the index lookup.
const TIMEOUT_SECS: u64 = 10;

/// Information about an available update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateInfo {
    /// Installed version.
    pub current: String,
    /// Latest published version.
    pub latest: String,
    /// Whether an update is available.
    pub update_available: bool,
    /// When this check was performed.
    pub checked_at: DateTime<Utc>,
}

impl UpdateInfo {
    pub fn new(current: impl Into<String>, latest: impl Into<String>) -> Self {
        let current = current.into();
        let latest = latest.into();
        let update_available = is_newer_version(&latest, &current);
        Self {
            current,
            latest,
            update_available,
            checked_at: Utc::now(),
        }
    }
}

/// Fetch the latest published version from a PyPI JSON endpoint.
pub fn check_latest(url: &str) -> Result<String> {
    fetch_latest_version(url).map_err(|e| SetupError::UpdateCheckFailed {
        message: format!("{:#}", e),
    })
}

/// Compare the installed version against the latest on the index.
pub fn check_for_update(current: &str, url: &str) -> Result<UpdateInfo> {
    let latest = check_latest(url)?;
    Ok(UpdateInfo::new(current, latest))
}

fn fetch_latest_version(url: &str) -> anyhow::Result<String> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .build()?;

    tracing::debug!("fetching {}", url);

    let response: serde_json::Value = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to reach {}", url))?
        .error_for_status()?
        .json()
        .context("Failed to parse package index response")?;

    let version = response["info"]["version"]
        .as_str()
        .context("No info.version in response")?;

    Ok(version.to_string())
}

/// Whether `latest` is newer than `current`.
///
/// Strict semver first, then PyPI-style versions (`1.10`, `1.5.0.post1`,
/// `2.0rc1`). When neither side parses the strings are compared as text.
pub fn is_newer_version(latest: &str, current: &str) -> bool {
    if let (Ok(l), Ok(c)) = (Version::parse(latest), Version::parse(current)) {
        return l > c;
    }
    match (release_key(latest), release_key(current)) {
        (Some(l), Some(c)) => l > c,
        _ => latest.trim() > current.trim(),
    }
}

/// Ordering key for a release string: the numeric release, then whether it
/// is a dev, pre, final or post release, then that suffix's number.
fn release_key(version: &str) -> Option<(Version, i8, u64)> {
    let version = version.trim().to_ascii_lowercase();
    let version = version.strip_prefix('v').unwrap_or(&version);
    let core = parse_version(version)?;

    let suffix = version
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.')
        .trim_start_matches(['-', '_', '.']);
    let rank = if suffix.is_empty() {
        0
    } else if suffix.starts_with("dev") {
        -2
    } else if ["a", "b", "c", "rc", "pre", "alpha", "beta"]
        .iter()
        .any(|tag| suffix.starts_with(tag))
    {
        -1
    } else {
        // post, rev, r, or a bare number
        1
    };
    let number = suffix
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .split(|c: char| !c.is_ascii_digit())
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);

    Some((core, rank, number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_newer_version_basic() {
        assert!(is_newer_version("1.5.0", "1.4.2"));
        assert!(is_newer_version("2.0.0", "1.9.9"));
        assert!(!is_newer_version("1.4.2", "1.4.2"));
        assert!(!is_newer_version("1.4.0", "1.5.0"));
    }

    #[test]
    fn pypi_versions_compare_numerically() {
        assert!(is_newer_version("1.5", "1.4"));
        assert!(!is_newer_version("1.5", "1.5"));
        assert!(is_newer_version("1.10", "1.9"));
        assert!(!is_newer_version("1.9", "1.10"));
    }

    #[test]
    fn post_and_pre_releases_are_ordered() {
        assert!(!is_newer_version("1.5.0", "1.5.0.post1"));
        assert!(is_newer_version("1.5.0.post1", "1.5.0"));
        assert!(is_newer_version("1.5.0.post2", "1.5.0.post1"));
        assert!(is_newer_version("2.0", "2.0rc1"));
        assert!(!is_newer_version("2.0rc1", "2.0"));
        assert!(is_newer_version("2.0rc2", "2.0rc1"));
        assert!(is_newer_version("2.0a1", "2.0.dev3"));
    }

    #[test]
    fn unparseable_versions_compare_as_text() {
        assert!(!is_newer_version("unknown", "unknown"));
        assert!(is_newer_version("b", "a"));
        assert!(!is_newer_version("a", "b"));
    }

    #[test]
    fn update_info_computes_availability() {
        let info = UpdateInfo::new("1.4.0", "1.5.0");
        assert!(info.update_available);
        assert_eq!(info.current, "1.4.0");

        let same = UpdateInfo::new("1.5.0", "1.5.0");
        assert!(!same.update_available);
    }

    #[test]
    fn unreachable_index_is_update_check_failed() {
        let err = check_latest("http://127.0.0.1:9/pypi/wrkmon/json").unwrap_err();
        assert!(matches!(err, SetupError::UpdateCheckFailed { .. }));
    }
}
