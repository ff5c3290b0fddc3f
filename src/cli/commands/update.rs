//! Update command implementation.
//!
//! The `wrkmon-setup update` command compares the installed target package
//! with the latest release on the package index and upgrades it.

use crate::cli::args::UpdateArgs;
use crate::error::{Result, SetupError};
use crate::requirements::{DependencyRegistry, Interpreter, OutcomeStatus, Scanner};
use crate::ui::{Prompt, UserInterface};
use crate::updates::{check_for_update, upgrade};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The update command implementation.
pub struct UpdateCommand<'a> {
    ctx: CommandContext<'a>,
    args: UpdateArgs,
}

impl<'a> UpdateCommand<'a> {
    /// Create a new update command.
    pub fn new(ctx: CommandContext<'a>, args: UpdateArgs) -> Self {
        Self { ctx, args }
    }
}

impl Command for UpdateCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let package = &self.ctx.config.package;
        let registry = DependencyRegistry::from_config(self.ctx.config);
        let spec = registry
            .get(&package.name)
            .ok_or_else(|| SetupError::Other(anyhow::anyhow!("unknown package {}", package.name)))?;

        let (mut overlay, host) = self.ctx.detect();
        let Some(installed) = Scanner::new(self.ctx.runner).scan(spec, &overlay) else {
            ui.error(&format!(
                "{} is not installed. Run `wrkmon-setup run` first.",
                package.name
            ));
            return Ok(CommandResult::failure(1));
        };

        let info = check_for_update(installed.raw.trim(), &package.index_url)?;

        if self.ctx.json {
            let text =
                serde_json::to_string_pretty(&info).map_err(|e| SetupError::Other(e.into()))?;
            println!("{}", text);
        }

        if !info.update_available {
            ui.success(&format!("{} {} is up to date", package.name, info.current));
            return Ok(CommandResult::success());
        }

        ui.message(&format!(
            "A new version of {} is available: {} -> {}",
            package.name, info.current, info.latest
        ));

        if self.args.check {
            return Ok(CommandResult::success());
        }

        if !self.args.yes {
            let prompt = Prompt::confirm(
                format!("upgrade_{}", package.name),
                format!("Upgrade {} to {}?", package.name, info.latest),
                true,
            );
            if !ui.confirm(&prompt)? {
                ui.warning("Upgrade declined");
                return Ok(CommandResult::success());
            }
        }

        let interpreter = registry
            .python()
            .and_then(|python| Scanner::new(self.ctx.runner).interpreter(python, &overlay))
            .unwrap_or_else(|| Interpreter::default_for(host.os_family));
        let outcome = upgrade(spec, &host, &interpreter, self.ctx.runner, &mut overlay, ui);
        ui.show_outcome(&outcome);

        Ok(if outcome.status == OutcomeStatus::Installed {
            CommandResult::success()
        } else {
            CommandResult::failure(1)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SetupConfig;
    use crate::shell::MockRunner;
    use crate::ui::MockUI;

    #[test]
    fn not_installed_fails_without_network() {
        let config = SetupConfig::default();
        let runner = MockRunner::new();
        let ctx = CommandContext {
            config: &config,
            runner: &runner,
            json: false,
        };
        let mut ui = MockUI::new();

        let result = UpdateCommand::new(ctx, UpdateArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("wrkmon is not installed"));
    }
}
