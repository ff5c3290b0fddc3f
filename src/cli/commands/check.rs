//! Check command implementation.
//!
//! The `wrkmon-setup check` command scans the host and prints a table of
//! dependencies without installing anything.

use crate::error::Result;
use crate::requirements::DependencyRegistry;
use crate::runner::{Bootstrap, Report};
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandContext, CommandResult};

/// The check command implementation.
pub struct CheckCommand<'a> {
    ctx: CommandContext<'a>,
}

impl<'a> CheckCommand<'a> {
    /// Create a new check command.
    pub fn new(ctx: CommandContext<'a>) -> Self {
        Self { ctx }
    }
}

/// Render a report as a dependency table.
pub fn report_table(report: &Report) -> Table {
    let mut table = Table::new(vec!["Dependency", "Required", "Status", "Version"]);
    for outcome in &report.outcomes {
        let status = outcome.status.to_string();
        let version = outcome
            .version
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            outcome.dependency.as_str(),
            if outcome.required { "yes" } else { "no" },
            status.as_str(),
            version.as_str(),
        ]);
    }
    table
}

impl Command for CheckCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = DependencyRegistry::from_config(self.ctx.config);
        let (overlay, host) = self.ctx.detect();
        let report = Bootstrap::new(&registry, &host, self.ctx.runner).check(&overlay);

        if self.ctx.json {
            println!("{}", report.to_json()?);
        } else {
            ui.show_header(&format!("Dependencies on {}", host));
            ui.message(&report_table(&report).render());
            for outcome in report.outcomes.iter().filter(|o| o.is_fatal()) {
                ui.error(&format!("{} is missing", outcome.dependency));
            }
        }

        Ok(CommandResult::from_exit_code(report.exit_code()))
    }
}
