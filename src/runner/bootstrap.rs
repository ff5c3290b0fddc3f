//! The bootstrap sequence.
//!
//! Dependencies are handled strictly in registry order. Each one is
//! scanned, resolved, confirmed with the user and installed before the
//! next begins, and its outcome is printed as soon as it is known. A
//! required dependency that ends in `Failed` stops the run; everything
//! after it is reported as not attempted.

use tracing::{debug, warn};

use crate::environment::HostProfile;
use crate::error::Result;
use crate::requirements::{
    plan, DependencyRegistry, DependencySpec, EnvironmentOverlay, Executor, Interpreter, Outcome,
    OutcomeStatus, Plan, Scanner,
};
use crate::shell::CommandRunner;
use crate::ui::{Prompt, UserInterface};

use super::report::Report;

/// Options for a bootstrap run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Install without asking.
    pub assume_yes: bool,
    /// Do not install optional dependencies.
    pub skip_optional: bool,
}

/// Drives the scan, resolve, install, verify loop over a registry.
pub struct Bootstrap<'a> {
    registry: &'a DependencyRegistry,
    host: &'a HostProfile,
    runner: &'a dyn CommandRunner,
}

impl<'a> Bootstrap<'a> {
    pub fn new(
        registry: &'a DependencyRegistry,
        host: &'a HostProfile,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            registry,
            host,
            runner,
        }
    }

    /// Bring every dependency to a satisfied state, in order.
    pub fn run(
        &self,
        options: &RunOptions,
        overlay: &mut EnvironmentOverlay,
        ui: &mut dyn UserInterface,
    ) -> Result<Report> {
        let mut report = Report::new(self.host.clone());
        let specs = self.registry.specs();
        let total = specs.len();

        debug!("bootstrap on {}", self.host);

        for (index, spec) in specs.iter().enumerate() {
            ui.show_progress(index + 1, total);
            let outcome = self.run_one(spec, options, overlay, ui)?;
            let fatal = outcome.is_fatal();
            report.outcomes.push(outcome);

            if fatal {
                report.not_attempted = specs[index + 1..]
                    .iter()
                    .map(|s| s.name.clone())
                    .collect();
                warn!(
                    "{} is required and could not be installed; stopping",
                    spec.name
                );
                break;
            }
        }

        report.finished_at = chrono::Utc::now();
        ui.show_run_summary(&report.summary());
        Ok(report)
    }

    fn run_one(
        &self,
        spec: &DependencySpec,
        options: &RunOptions,
        overlay: &mut EnvironmentOverlay,
        ui: &mut dyn UserInterface,
    ) -> Result<Outcome> {
        let scanner = Scanner::new(self.runner);
        let mut spinner = ui.start_spinner(&format!("Checking {}...", spec.name));

        let interpreter = self.interpreter_for(spec, &scanner, overlay);
        let strategies = match plan(spec, self.host, &scanner, overlay, interpreter.as_ref()) {
            Plan::AlreadySatisfied { by, found } => {
                let outcome = satisfied(spec, &by, found.version.clone(), &found.to_string());
                spinner.finish_success(&format!("{}: {}", spec.name, outcome.detail));
                return Ok(outcome);
            }
            Plan::Install(strategies) => strategies,
        };
        spinner.finish_skipped(&format!("{}: not found", spec.name));

        if !spec.required && options.skip_optional {
            let outcome = Outcome::new(
                &spec.name,
                false,
                OutcomeStatus::SkippedOptional,
                "skipped (optional)",
            );
            ui.show_outcome(&outcome);
            return Ok(outcome);
        }

        if !options.assume_yes {
            let prompt = Prompt::confirm(
                format!("install_{}", spec.name),
                format!("{} ({}) is missing. Install it now?", spec.name, spec.description),
                true,
            );
            if !ui.confirm(&prompt)? {
                let outcome = Outcome::new(&spec.name, spec.required, declined(spec), "declined");
                ui.show_outcome(&outcome);
                return Ok(outcome);
            }
        }

        ui.show_header(&format!("Installing {}", spec.name));
        let outcome = Executor::new(self.runner, self.host).execute(spec, &strategies, overlay, ui);
        ui.show_outcome(&outcome);
        Ok(outcome)
    }

    /// Scan every dependency without installing anything.
    pub fn check(&self, overlay: &EnvironmentOverlay) -> Report {
        let scanner = Scanner::new(self.runner);
        let mut report = Report::new(self.host.clone());

        for spec in self.registry.specs() {
            let outcome = match scanner.satisfied_by(spec, overlay) {
                Some((by, found)) => {
                    satisfied(spec, &by, found.version.clone(), &found.to_string())
                }
                None => Outcome::new(&spec.name, spec.required, declined(spec), "not found"),
            };
            report.outcomes.push(outcome);
        }

        report
    }

    /// What a run would do for each dependency, without executing anything.
    pub fn plans(&self, overlay: &EnvironmentOverlay) -> Vec<(&'a DependencySpec, Plan)> {
        let scanner = Scanner::new(self.runner);
        self.registry
            .specs()
            .iter()
            .map(|spec| {
                let interpreter = self.interpreter_for(spec, &scanner, overlay);
                (spec, plan(spec, self.host, &scanner, overlay, interpreter.as_ref()))
            })
            .collect()
    }

    /// The interpreter that installs `spec`, for Python distributions.
    ///
    /// Re-scanned each time so an interpreter installed earlier in the run
    /// is picked up through the overlay.
    fn interpreter_for(
        &self,
        spec: &DependencySpec,
        scanner: &Scanner<'_>,
        overlay: &EnvironmentOverlay,
    ) -> Option<Interpreter> {
        spec.python_distribution()?;
        let python = self.registry.python()?;
        scanner.interpreter(python, overlay)
    }
}

fn satisfied(
    spec: &DependencySpec,
    by: &str,
    version: Option<semver::Version>,
    found: &str,
) -> Outcome {
    let detail = if by == spec.name {
        found.to_string()
    } else {
        format!("satisfied by {} ({})", by, found)
    };
    Outcome::new(&spec.name, spec.required, OutcomeStatus::AlreadySatisfied, detail)
        .with_version(version)
}

/// Status for a dependency that will not be installed.
fn declined(spec: &DependencySpec) -> OutcomeStatus {
    if spec.required {
        OutcomeStatus::Failed
    } else {
        OutcomeStatus::SkippedOptional
    }
}
