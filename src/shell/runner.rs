//! The seam between orchestration logic and the host.
//!
//! Scanner and executor never spawn processes directly; they go through a
//! [`CommandRunner`]. [`SystemRunner`] is the production implementation;
//! [`MockRunner`](super::MockRunner) records everything for tests.

use std::path::PathBuf;

use crate::error::Result;
use crate::requirements::overlay::EnvironmentOverlay;

use super::command::{execute, CommandOptions, CommandResult, Invocation};

/// Host operations needed to scan for and install dependencies.
pub trait CommandRunner {
    /// Locate a program on the overlay's search path.
    fn locate(&self, program: &str, overlay: &EnvironmentOverlay) -> Option<PathBuf>;

    /// Run a query command with captured output (version checks).
    fn capture(&self, invocation: &Invocation, overlay: &EnvironmentOverlay)
        -> Result<CommandResult>;

    /// Run an install command with inherited stdio, blocking until it exits.
    fn run(&self, invocation: &Invocation, overlay: &EnvironmentOverlay) -> Result<CommandResult>;
}

/// Runs real subprocesses.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    /// Resolve the program against the overlay so children launched by
    /// bare name see freshly installed tools.
    fn resolved(&self, invocation: &Invocation, overlay: &EnvironmentOverlay) -> Invocation {
        match overlay.which(&invocation.program) {
            Some(path) => Invocation {
                program: path.to_string_lossy().into_owned(),
                args: invocation.args.clone(),
            },
            None => invocation.clone(),
        }
    }
}

impl CommandRunner for SystemRunner {
    fn locate(&self, program: &str, overlay: &EnvironmentOverlay) -> Option<PathBuf> {
        overlay.which(program)
    }

    fn capture(
        &self,
        invocation: &Invocation,
        overlay: &EnvironmentOverlay,
    ) -> Result<CommandResult> {
        let options = CommandOptions {
            search_path: overlay.child_path(),
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        };
        execute(&self.resolved(invocation, overlay), &options)
    }

    fn run(&self, invocation: &Invocation, overlay: &EnvironmentOverlay) -> Result<CommandResult> {
        let options = CommandOptions {
            search_path: overlay.child_path(),
            ..Default::default()
        };
        execute(&self.resolved(invocation, overlay), &options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn system_runner_captures_version_output() {
        let overlay = EnvironmentOverlay::new(
            crate::requirements::overlay::parse_system_path(),
            None,
        );
        let result = SystemRunner
            .capture(&Invocation::new("sh", ["-c", "echo 1.2.3"]), &overlay)
            .unwrap();
        assert!(result.success);
        assert_eq!(result.stdout.trim(), "1.2.3");
    }

    #[test]
    fn system_runner_locate_misses_unknown_program() {
        let overlay = EnvironmentOverlay::new(
            crate::requirements::overlay::parse_system_path(),
            None,
        );
        assert!(SystemRunner
            .locate("definitely-not-a-real-program-3f9a", &overlay)
            .is_none());
    }
}
