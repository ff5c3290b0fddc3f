//! wrkmon-setup - Dependency bootstrapper for the wrkmon terminal music player.
//!
//! Detects the host (OS family, architecture, privilege, package managers),
//! scans for Python, mpv, deno and the `wrkmon` package, and installs
//! whatever is missing through the package manager the host actually has,
//! falling back tier by tier until something works or only manual
//! instructions remain.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and parsing
//! - [`environment`] - Host detection
//! - [`error`] - Error types and result aliases
//! - [`requirements`] - Dependency specs, scanning, resolution and installation
//! - [`runner`] - The bootstrap sequence and its report
//! - [`shell`] - Subprocess execution
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//! - [`updates`] - Checking PyPI for a newer wrkmon
//!
//! # Example
//!
//! ```
//! use wrkmon_setup::environment::{HostProfile, LinuxPackageManager, OsFamily, Privilege};
//! use wrkmon_setup::requirements::{resolve, DependencyRegistry, StrategyKind};
//!
//! let host = HostProfile::new(OsFamily::Linux, Privilege::ElevatedAvailable)
//!     .with_linux_pkg_manager(LinuxPackageManager::Apt);
//! let registry = DependencyRegistry::new();
//!
//! let strategies = resolve(registry.get("mpv").unwrap(), &host);
//! assert_eq!(strategies[0].kind, StrategyKind::PrimaryPkgMgr);
//! assert_eq!(strategies.last().unwrap().kind, StrategyKind::ManualDownload);
//! ```

pub mod cli;
pub mod config;
pub mod environment;
pub mod error;
pub mod requirements;
pub mod runner;
pub mod shell;
pub mod ui;
pub mod updates;

pub use error::{Result, SetupError};
