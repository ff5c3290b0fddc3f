//! Host environment detection.
//!
//! Determines the OS family, architecture, privilege level, and available
//! package managers. The probe runs once per invocation and produces an
//! immutable [`HostProfile`]. Detection order for the OS family:
//!
//! 1. Kernel identification string (`uname -s`)
//! 2. OS hint environment variables (`OS`, `OSTYPE`)
//! 3. Fallback to `unknown`

pub mod detection;
pub mod profile;

pub use detection::{is_wsl_release, probe, ProbeInputs};
pub use profile::{
    ElevationHelper, HostProfile, LinuxPackageManager, OsFamily, PackageManager, Privilege,
};
