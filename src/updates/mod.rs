//! Update checking for the target package.
//!
//! This module provides:
//! - Latest-release lookup against the package index
//! - Upgrading through the host's package manager

pub mod upgrade;
pub mod version;

pub use upgrade::upgrade;
pub use version::{check_for_update, check_latest, is_newer_version, UpdateInfo, USER_AGENT};
