//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandContext`] for what every command shares
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands, RunArgs};
use crate::config::SetupConfig;
use crate::environment::{probe, HostProfile};
use crate::error::Result;
use crate::requirements::EnvironmentOverlay;
use crate::shell::{CommandRunner, SystemRunner};
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// Result matching a process exit code.
    pub fn from_exit_code(exit_code: i32) -> Self {
        if exit_code == 0 {
            Self::success()
        } else {
            Self::failure(exit_code)
        }
    }
}

/// Everything a command needs besides its own arguments.
#[derive(Clone, Copy)]
pub struct CommandContext<'a> {
    pub config: &'a SetupConfig,
    pub runner: &'a dyn CommandRunner,
    /// Print machine-readable JSON instead of human output.
    pub json: bool,
}

impl<'a> CommandContext<'a> {
    /// Discover the search path and probe the host.
    pub fn detect(&self) -> (EnvironmentOverlay, HostProfile) {
        let overlay = EnvironmentOverlay::discover();
        let host = probe(self.runner, &overlay);
        (overlay, host)
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config: SetupConfig,
    runner: Box<dyn CommandRunner>,
    json: bool,
}

impl CommandDispatcher {
    /// Create a dispatcher that runs real subprocesses.
    pub fn new(config: SetupConfig) -> Self {
        Self {
            config,
            runner: Box::new(SystemRunner),
            json: false,
        }
    }

    /// Use a different command runner.
    pub fn with_runner(mut self, runner: Box<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Emit JSON reports.
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &SetupConfig {
        &self.config
    }

    fn context(&self) -> CommandContext<'_> {
        CommandContext {
            config: &self.config,
            runner: self.runner.as_ref(),
            json: self.json,
        }
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let ctx = self.context();
        match &cli.command {
            Some(Commands::Run(args)) => super::run::RunCommand::new(ctx, args.clone()).execute(ui),
            Some(Commands::Check) => super::check::CheckCommand::new(ctx).execute(ui),
            Some(Commands::Plan) => super::plan::PlanCommand::new(ctx).execute(ui),
            Some(Commands::Update(args)) => {
                super::update::UpdateCommand::new(ctx, args.clone()).execute(ui)
            }
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => super::run::RunCommand::new(ctx, RunArgs::default()).execute(ui),
        }
    }
}
