//! Error types for wrkmon-setup operations.
//!
//! This module defines [`SetupError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Strategy-level failures are values ([`AttemptFailed`](crate::requirements::AttemptFailed)),
//!   recovered by moving on to the next strategy
//! - `SetupError` covers run-level failures and the ambient concerns
//!   (config, IO, update checks)
//! - Use `anyhow::Error` (via `SetupError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for wrkmon-setup operations.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The host OS or package manager could not be recognized.
    #[error("Could not recognize {what}: {detail}")]
    DetectionAmbiguous { what: String, detail: String },

    /// A strategy needs root but no elevation helper is available.
    #[error("'{strategy}' requires root privileges and neither sudo nor doas is available")]
    PrivilegeInsufficient { strategy: String },

    /// Every strategy for a dependency failed.
    #[error("All installation strategies for '{dependency}' failed: {attempts}")]
    StrategyExhausted {
        dependency: String,
        attempts: String,
    },

    /// An external command returned nonzero or could not be spawned.
    #[error("Command failed with exit code {code:?}: {command}")]
    ExternalToolFailure { command: String, code: Option<i32> },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Querying the package index for a newer release failed.
    #[error("Update check failed: {message}")]
    UpdateCheckFailed { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for wrkmon-setup operations.
pub type Result<T> = std::result::Result<T, SetupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_ambiguous_displays_what_and_detail() {
        let err = SetupError::DetectionAmbiguous {
            what: "operating system".into(),
            detail: "kernel reported 'Haiku'".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("operating system"));
        assert!(msg.contains("Haiku"));
    }

    #[test]
    fn privilege_insufficient_names_strategy() {
        let err = SetupError::PrivilegeInsufficient {
            strategy: "apt-get install mpv".into(),
        };
        assert!(err.to_string().contains("apt-get install mpv"));
    }

    #[test]
    fn strategy_exhausted_displays_dependency_and_attempts() {
        let err = SetupError::StrategyExhausted {
            dependency: "mpv".into(),
            attempts: "apt: exited with code 100".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("mpv"));
        assert!(msg.contains("exited with code 100"));
    }

    #[test]
    fn external_tool_failure_displays_command_and_code() {
        let err = SetupError::ExternalToolFailure {
            command: "brew install mpv".into(),
            code: Some(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("brew install mpv"));
        assert!(msg.contains("1"));
    }

    #[test]
    fn config_parse_error_displays_path_and_message() {
        let err = SetupError::ConfigParseError {
            path: PathBuf::from("/home/me/.wrkmon-setup/config.yml"),
            message: "invalid type".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("config.yml"));
        assert!(msg.contains("invalid type"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: SetupError = io_err.into();
        assert!(matches!(err, SetupError::Io(_)));
    }

    #[test]
    fn anyhow_error_converts_to_other() {
        let err: SetupError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, SetupError::Other(_)));
        assert_eq!(err.to_string(), "boom");
    }
}
