//! Run command implementation.
//!
//! The `wrkmon-setup run` command brings every dependency to a satisfied
//! state.

use crate::cli::args::RunArgs;
use crate::error::Result;
use crate::requirements::DependencyRegistry;
use crate::runner::{Bootstrap, RunOptions};
use crate::ui::{OutputMode, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The run command implementation.
pub struct RunCommand<'a> {
    ctx: CommandContext<'a>,
    args: RunArgs,
}

impl<'a> RunCommand<'a> {
    /// Create a new run command.
    pub fn new(ctx: CommandContext<'a>, args: RunArgs) -> Self {
        Self { ctx, args }
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Merge flags over config file settings.
    fn build_options(&self) -> RunOptions {
        let settings = &self.ctx.config.settings;
        RunOptions {
            assume_yes: self.args.yes || settings.assume_yes,
            skip_optional: self.args.skip_optional || settings.skip_optional,
        }
    }
}

impl Command for RunCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.ctx.json {
            ui.set_output_mode(OutputMode::Silent);
        }

        ui.show_header("wrkmon setup");

        let registry = DependencyRegistry::from_config(self.ctx.config);
        let (mut overlay, host) = self.ctx.detect();
        ui.show_hint(&format!("Host: {}", host));

        let options = self.build_options();
        let report = Bootstrap::new(&registry, &host, self.ctx.runner).run(
            &options,
            &mut overlay,
            ui,
        )?;

        if self.ctx.json {
            println!("{}", report.to_json()?);
        }

        Ok(CommandResult::from_exit_code(report.exit_code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SetupConfig;
    use crate::shell::MockRunner;
    use crate::ui::MockUI;

    fn installed() -> MockRunner {
        MockRunner::new()
            .with_tool("python3", "Python 3.12.1")
            .with_tool("mpv", "mpv 0.38.0")
            .with_tool("deno", "deno 2.1.4")
            .with_module("python3", "wrkmon", "1.4.0")
    }

    #[test]
    fn flags_override_config() {
        let config = SetupConfig::default();
        let runner = MockRunner::new();
        let ctx = CommandContext {
            config: &config,
            runner: &runner,
            json: false,
        };
        let cmd = RunCommand::new(
            ctx,
            RunArgs {
                yes: true,
                ..Default::default()
            },
        );
        let options = cmd.build_options();
        assert!(options.assume_yes);
        assert!(!options.skip_optional);
    }

    #[test]
    fn config_settings_apply_without_flags() {
        let mut config = SetupConfig::default();
        config.settings.skip_optional = true;
        let runner = MockRunner::new();
        let ctx = CommandContext {
            config: &config,
            runner: &runner,
            json: false,
        };
        let options = RunCommand::new(ctx, RunArgs::default()).build_options();
        assert!(options.skip_optional);
    }

    #[test]
    fn satisfied_host_exits_zero() {
        let config = SetupConfig::default();
        let runner = installed();
        let ctx = CommandContext {
            config: &config,
            runner: &runner,
            json: false,
        };
        let mut ui = MockUI::new();

        let result = RunCommand::new(ctx, RunArgs::default()).execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(runner.runs().is_empty());
        assert_eq!(ui.headers()[0], "wrkmon setup");
    }
}
