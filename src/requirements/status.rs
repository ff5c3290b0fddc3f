//! Result types for scans, install attempts, and per-dependency outcomes.
//!
//! A scan yields an [`InstalledVersion`]; an install attempt yields
//! `Result<Confirmed, AttemptFailed>`; every dependency ends a run with
//! exactly one [`Outcome`].

use semver::Version;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// A dependency found on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledVersion {
    /// The program that answered the detection query.
    pub program: String,
    /// Where that program lives.
    pub path: PathBuf,
    /// Arguments that select it, such as `-3` for the `py` launcher.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub launcher_args: Vec<String>,
    /// Parsed version, when the output carried one.
    pub version: Option<Version>,
    /// First line of the query output.
    pub raw: String,
}

impl fmt::Display for InstalledVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{} {}", self.program, v),
            None => write!(f, "{}", self.program),
        }
    }
}

/// Final status of one dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    AlreadySatisfied,
    Installed,
    Failed,
    SkippedOptional,
}

impl OutcomeStatus {
    /// Whether the dependency is usable after the run.
    pub fn is_satisfied(self) -> bool {
        matches!(self, OutcomeStatus::AlreadySatisfied | OutcomeStatus::Installed)
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutcomeStatus::AlreadySatisfied => "already satisfied",
            OutcomeStatus::Installed => "installed",
            OutcomeStatus::Failed => "failed",
            OutcomeStatus::SkippedOptional => "skipped (optional)",
        })
    }
}

/// What happened to one dependency during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub dependency: String,
    pub required: bool,
    pub status: OutcomeStatus,
    pub detail: String,
    pub version: Option<Version>,
}

impl Outcome {
    pub fn new(
        dependency: impl Into<String>,
        required: bool,
        status: OutcomeStatus,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            dependency: dependency.into(),
            required,
            status,
            detail: detail.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: Option<Version>) -> Self {
        self.version = version;
        self
    }

    /// A required dependency that ended in `Failed`.
    pub fn is_fatal(&self) -> bool {
        self.required && self.status == OutcomeStatus::Failed
    }
}

/// A strategy whose install was confirmed by a rescan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmed {
    /// Label of the strategy that succeeded.
    pub strategy: String,
    /// What the rescan found.
    pub found: InstalledVersion,
}

/// Why a single strategy did not deliver the dependency.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptFailed {
    #[error("{strategy}: needs root and no elevation helper is available")]
    PrivilegeInsufficient { strategy: String },

    #[error("{strategy}: `{command}` {}", exit_description(.code))]
    ExternalToolFailure {
        strategy: String,
        command: String,
        code: Option<i32>,
    },

    #[error("{strategy}: command succeeded but the dependency is still not detected")]
    NotConfirmed { strategy: String },

    #[error("{strategy}: manual step required")]
    Advisory { strategy: String },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exited with status {}", c),
        None => "could not be started".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satisfied_statuses() {
        assert!(OutcomeStatus::AlreadySatisfied.is_satisfied());
        assert!(OutcomeStatus::Installed.is_satisfied());
        assert!(!OutcomeStatus::Failed.is_satisfied());
        assert!(!OutcomeStatus::SkippedOptional.is_satisfied());
    }

    #[test]
    fn only_required_failures_are_fatal() {
        assert!(Outcome::new("mpv", true, OutcomeStatus::Failed, "").is_fatal());
        assert!(!Outcome::new("deno", false, OutcomeStatus::Failed, "").is_fatal());
        assert!(!Outcome::new("mpv", true, OutcomeStatus::Installed, "").is_fatal());
    }

    #[test]
    fn outcome_serializes_status_and_version() {
        let outcome = Outcome::new("python", true, OutcomeStatus::AlreadySatisfied, "python3")
            .with_version(Some(Version::new(3, 12, 1)));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "already_satisfied");
        assert_eq!(json["version"], "3.12.1");
    }

    #[test]
    fn tool_failure_message_includes_exit_code() {
        let err = AttemptFailed::ExternalToolFailure {
            strategy: "apt".to_string(),
            command: "apt-get install -y mpv".to_string(),
            code: Some(100),
        };
        let msg = err.to_string();
        assert!(msg.contains("apt-get install -y mpv"));
        assert!(msg.contains("status 100"));
    }

    #[test]
    fn spawn_failure_message() {
        let err = AttemptFailed::ExternalToolFailure {
            strategy: "winget".to_string(),
            command: "winget install mpv".to_string(),
            code: None,
        };
        assert!(err.to_string().contains("could not be started"));
    }

    #[test]
    fn installed_version_display() {
        let found = InstalledVersion {
            program: "mpv".to_string(),
            path: PathBuf::from("/usr/bin/mpv"),
            launcher_args: Vec::new(),
            version: Some(Version::new(0, 38, 0)),
            raw: "mpv 0.38.0".to_string(),
        };
        assert_eq!(found.to_string(), "mpv 0.38.0");
    }
}
