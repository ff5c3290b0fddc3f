//! Plan command implementation.
//!
//! The `wrkmon-setup plan` command prints the detected host and the
//! strategies a run would try, without executing any of them.

use serde_json::json;

use crate::error::{Result, SetupError};
use crate::requirements::{DependencyRegistry, Plan};
use crate::runner::Bootstrap;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The plan command implementation.
pub struct PlanCommand<'a> {
    ctx: CommandContext<'a>,
}

impl<'a> PlanCommand<'a> {
    /// Create a new plan command.
    pub fn new(ctx: CommandContext<'a>) -> Self {
        Self { ctx }
    }
}

impl Command for PlanCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = DependencyRegistry::from_config(self.ctx.config);
        let (overlay, host) = self.ctx.detect();
        let plans = Bootstrap::new(&registry, &host, self.ctx.runner).plans(&overlay);

        if self.ctx.json {
            let dependencies: Vec<_> = plans
                .iter()
                .map(|(spec, plan)| match plan {
                    Plan::AlreadySatisfied { by, found } => json!({
                        "dependency": spec.name,
                        "required": spec.required,
                        "satisfied_by": by,
                        "found": found,
                    }),
                    Plan::Install(strategies) => json!({
                        "dependency": spec.name,
                        "required": spec.required,
                        "strategies": strategies,
                    }),
                })
                .collect();
            let doc = json!({ "host": host, "dependencies": dependencies });
            let text =
                serde_json::to_string_pretty(&doc).map_err(|e| SetupError::Other(e.into()))?;
            println!("{}", text);
            return Ok(CommandResult::success());
        }

        ui.show_header("Installation plan");
        ui.message(&format!("Host: {}", host));
        if !host.package_managers.is_empty() {
            let managers: Vec<_> = host.package_managers.iter().map(|m| m.name()).collect();
            ui.message(&format!("Package managers: {}", managers.join(", ")));
        }

        for (spec, plan) in &plans {
            let required = if spec.required { "" } else { " (optional)" };
            match plan {
                Plan::AlreadySatisfied { by, found } => {
                    ui.success(&format!("{}{}: satisfied by {} ({})", spec.name, required, by, found));
                }
                Plan::Install(strategies) => {
                    ui.message(&format!("{}{}: would try", spec.name, required));
                    for (i, strategy) in strategies.iter().enumerate() {
                        ui.message(&format!("  {}. {}", i + 1, strategy));
                    }
                }
            }
        }

        Ok(CommandResult::success())
    }
}
