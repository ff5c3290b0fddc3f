//! Dependency requirements: what wrkmon needs and how to get it.
//!
//! # Modules
//!
//! - [`registry`] - The dependency specs (python, mpv, deno, wrkmon)
//! - [`checker`] - Capability scanning against PATH and interpreters
//! - [`resolver`] - Ordering of installation strategies per host
//! - [`installer`] - Running strategies and confirming the result
//! - [`overlay`] - Process-local PATH additions made during a run
//! - [`status`] - Outcomes and per-attempt failures
//! - [`strategy`] - Strategy types

pub mod checker;
pub mod installer;
pub mod overlay;
pub mod registry;
pub mod resolver;
pub mod status;
pub mod strategy;

pub use checker::{parse_version, Scanner};
pub use installer::Executor;
pub use overlay::EnvironmentOverlay;
pub use registry::{Detection, DependencyRegistry, DependencySpec, Interpreter};
pub use resolver::{plan, resolve, resolve_for, resolve_upgrade, Plan};
pub use status::{AttemptFailed, Confirmed, InstalledVersion, Outcome, OutcomeStatus};
pub use strategy::{Strategy, StrategyAction, StrategyKind};
