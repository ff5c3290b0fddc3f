//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! Commands are dispatched via [`CommandDispatcher`], which owns the loaded
//! configuration and the [`CommandRunner`](crate::shell::CommandRunner)
//! every command probes and installs through.

pub mod check;
pub mod completions;
pub mod dispatcher;
pub mod plan;
pub mod run;
pub mod update;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
