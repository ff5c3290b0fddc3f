//! Installation executor.
//!
//! Walks a resolved strategy list in order. Each attempt either runs to
//! completion and is confirmed by a rescan, or fails and hands over to the
//! next strategy. The first confirmed strategy ends the walk.

use crate::environment::{ElevationHelper, HostProfile, Privilege};
use crate::error::SetupError;
use crate::requirements::checker::Scanner;
use crate::requirements::overlay::EnvironmentOverlay;
use crate::requirements::registry::DependencySpec;
use crate::requirements::status::{AttemptFailed, Confirmed, Outcome, OutcomeStatus};
use crate::requirements::strategy::{Strategy, StrategyAction};
use crate::shell::CommandRunner;
use crate::ui::UserInterface;

/// Runs strategies against a host.
pub struct Executor<'a> {
    runner: &'a dyn CommandRunner,
    host: &'a HostProfile,
}

impl<'a> Executor<'a> {
    pub fn new(runner: &'a dyn CommandRunner, host: &'a HostProfile) -> Self {
        Self { runner, host }
    }

    /// Try one strategy.
    ///
    /// Blocks until the command exits. On exit 0 the strategy's path
    /// additions are applied to `overlay` before the rescan, so the new
    /// tool is visible to the confirmation and to every later step.
    pub fn attempt(
        &self,
        spec: &DependencySpec,
        strategy: &Strategy,
        overlay: &mut EnvironmentOverlay,
        ui: &mut dyn UserInterface,
    ) -> Result<Confirmed, AttemptFailed> {
        let label = strategy.label.clone();

        let mut invocation = match &strategy.action {
            StrategyAction::Advice { instructions, url } => {
                ui.message(&format!("  {}: {}", spec.name, instructions));
                if let Some(url) = url {
                    ui.message(&format!("  See {}", url));
                }
                return Err(AttemptFailed::Advisory { strategy: label });
            }
            _ => match strategy.invocation() {
                Some(inv) => inv,
                None => return Err(AttemptFailed::Advisory { strategy: label }),
            },
        };

        if strategy.requires_privilege {
            match self.host.privilege {
                Privilege::Root => {}
                Privilege::ElevatedAvailable => {
                    let helper = self.host.elevation.unwrap_or(ElevationHelper::Sudo);
                    invocation = invocation.elevated(helper.program());
                }
                Privilege::Unprivileged => {
                    tracing::warn!(
                        "{}",
                        SetupError::PrivilegeInsufficient {
                            strategy: label.clone()
                        }
                    );
                    return Err(AttemptFailed::PrivilegeInsufficient { strategy: label });
                }
            }
        }

        ui.message(&format!("  Running: {}", invocation));
        tracing::debug!("{}: attempting {}", spec.name, strategy);

        let result = match self.runner.run(&invocation, overlay) {
            Ok(result) => result,
            Err(e) => {
                tracing::debug!("{}: {}", invocation, e);
                return Err(AttemptFailed::ExternalToolFailure {
                    strategy: label,
                    command: invocation.to_string(),
                    code: None,
                });
            }
        };
        if !result.success {
            return Err(AttemptFailed::ExternalToolFailure {
                strategy: label,
                command: invocation.to_string(),
                code: result.exit_code,
            });
        }

        for dir in &strategy.path_additions {
            overlay.prepend_home_relative(dir);
        }

        match Scanner::new(self.runner).scan(spec, overlay) {
            Some(found) => Ok(Confirmed {
                strategy: label,
                found,
            }),
            None => Err(AttemptFailed::NotConfirmed { strategy: label }),
        }
    }

    /// Try strategies in order until one is confirmed.
    ///
    /// Never returns `AlreadySatisfied`: callers check that before
    /// resolving strategies at all.
    pub fn execute(
        &self,
        spec: &DependencySpec,
        strategies: &[Strategy],
        overlay: &mut EnvironmentOverlay,
        ui: &mut dyn UserInterface,
    ) -> Outcome {
        let mut failures: Vec<AttemptFailed> = Vec::new();

        for strategy in strategies {
            match self.attempt(spec, strategy, overlay, ui) {
                Ok(confirmed) => {
                    return Outcome::new(
                        &spec.name,
                        spec.required,
                        OutcomeStatus::Installed,
                        format!("installed via {} ({})", confirmed.strategy, confirmed.found),
                    )
                    .with_version(confirmed.found.version);
                }
                Err(failure) => {
                    if !matches!(failure, AttemptFailed::Advisory { .. }) {
                        ui.warning(&format!("  {}", failure));
                    }
                    failures.push(failure);
                }
            }
        }

        let attempts = failures
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        let exhausted = SetupError::StrategyExhausted {
            dependency: spec.name.clone(),
            attempts,
        };
        tracing::debug!("{}", exhausted);

        let status = if spec.required {
            OutcomeStatus::Failed
        } else {
            OutcomeStatus::SkippedOptional
        };
        Outcome::new(&spec.name, spec.required, status, exhausted.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{LinuxPackageManager, OsFamily, PackageManager};
    use crate::requirements::registry::DependencyRegistry;
    use crate::requirements::resolver::resolve;
    use crate::requirements::strategy::StrategyKind;
    use crate::shell::{Invocation, MockRunner};
    use crate::ui::MockUI;

    fn spec(name: &str) -> DependencySpec {
        DependencyRegistry::new().get(name).unwrap().clone()
    }

    fn apt_mpv() -> Strategy {
        Strategy::command(
            StrategyKind::PrimaryPkgMgr,
            "apt",
            Invocation::new("apt-get", ["install", "-y", "mpv"]),
            true,
        )
    }

    #[test]
    fn unprivileged_host_skips_privileged_strategy_without_spawning() {
        let runner = MockRunner::new().on_run_installing("apt-get install", "mpv", "mpv 0.38.0");
        let host = HostProfile::new(OsFamily::Linux, Privilege::Unprivileged);
        let executor = Executor::new(&runner, &host);
        let mut ui = MockUI::new();
        let mut overlay = EnvironmentOverlay::default();

        let result = executor.attempt(&spec("mpv"), &apt_mpv(), &mut overlay, &mut ui);
        assert!(matches!(result, Err(AttemptFailed::PrivilegeInsufficient { .. })));
        assert!(runner.runs().is_empty());
    }

    #[test]
    fn elevated_host_prefixes_helper() {
        let runner = MockRunner::new().on_run_installing("sudo apt-get install", "mpv", "mpv 0.38.0");
        let host = HostProfile::new(OsFamily::Linux, Privilege::ElevatedAvailable);
        let executor = Executor::new(&runner, &host);
        let mut ui = MockUI::new();
        let mut overlay = EnvironmentOverlay::default();

        let confirmed = executor
            .attempt(&spec("mpv"), &apt_mpv(), &mut overlay, &mut ui)
            .unwrap();
        assert_eq!(confirmed.strategy, "apt");
        assert_eq!(runner.runs()[0].program, "sudo");
    }

    #[test]
    fn doas_is_used_when_detected() {
        let runner = MockRunner::new().on_run_installing("doas apt-get", "mpv", "mpv 0.38.0");
        let mut host = HostProfile::new(OsFamily::Linux, Privilege::ElevatedAvailable);
        host.elevation = Some(ElevationHelper::Doas);
        let executor = Executor::new(&runner, &host);
        let mut ui = MockUI::new();

        assert!(executor
            .attempt(&spec("mpv"), &apt_mpv(), &mut EnvironmentOverlay::default(), &mut ui)
            .is_ok());
        assert!(runner.has_run("doas apt-get install -y mpv"));
    }

    #[test]
    fn root_runs_directly() {
        let runner = MockRunner::new().on_run_installing("apt-get install", "mpv", "mpv 0.38.0");
        let host = HostProfile::new(OsFamily::Linux, Privilege::Root);
        let executor = Executor::new(&runner, &host);
        let mut ui = MockUI::new();

        executor
            .attempt(&spec("mpv"), &apt_mpv(), &mut EnvironmentOverlay::default(), &mut ui)
            .unwrap();
        assert_eq!(runner.runs()[0].program, "apt-get");
    }

    #[test]
    fn nonzero_exit_is_tool_failure() {
        let runner = MockRunner::new().on_run("apt-get", 100);
        let host = HostProfile::new(OsFamily::Linux, Privilege::Root);
        let executor = Executor::new(&runner, &host);
        let mut ui = MockUI::new();

        let result = executor.attempt(&spec("mpv"), &apt_mpv(), &mut EnvironmentOverlay::default(), &mut ui);
        assert!(matches!(
            result,
            Err(AttemptFailed::ExternalToolFailure { code: Some(100), .. })
        ));
    }

    #[test]
    fn exit_zero_without_tool_is_not_confirmed() {
        let runner = MockRunner::new().on_run("apt-get", 0);
        let host = HostProfile::new(OsFamily::Linux, Privilege::Root);
        let executor = Executor::new(&runner, &host);
        let mut ui = MockUI::new();

        let result = executor.attempt(&spec("mpv"), &apt_mpv(), &mut EnvironmentOverlay::default(), &mut ui);
        assert!(matches!(result, Err(AttemptFailed::NotConfirmed { .. })));
    }

    #[test]
    fn advice_prints_and_never_spawns() {
        let runner = MockRunner::new();
        let host = HostProfile::new(OsFamily::Linux, Privilege::Root);
        let executor = Executor::new(&runner, &host);
        let mut ui = MockUI::new();
        let advice = Strategy::advice("Install mpv by hand", Some("https://mpv.io".to_string()));

        let result = executor.attempt(&spec("mpv"), &advice, &mut EnvironmentOverlay::default(), &mut ui);
        assert!(matches!(result, Err(AttemptFailed::Advisory { .. })));
        assert!(ui.has_message("Install mpv by hand"));
        assert!(runner.runs().is_empty());
    }

    #[test]
    fn path_additions_reach_the_overlay() {
        let runner = MockRunner::new().on_run_installing("install.sh", "deno", "deno 2.1.4");
        let host = HostProfile::new(OsFamily::Linux, Privilege::Unprivileged);
        let executor = Executor::new(&runner, &host);
        let mut ui = MockUI::new();
        let mut overlay = EnvironmentOverlay::new(vec![], Some("/home/user".into()));

        let strategies = resolve(&spec("deno"), &host);
        let confirmed = executor
            .attempt(&spec("deno"), &strategies[0], &mut overlay, &mut ui)
            .unwrap();
        assert_eq!(confirmed.found.program, "deno");
        assert_eq!(
            overlay.additions(),
            &[std::path::PathBuf::from("/home/user/.deno/bin")]
        );
    }

    #[test]
    fn execute_stops_at_first_confirmed() {
        let runner = MockRunner::new()
            .on_run("choco install", 1)
            .on_run_installing("scoop install deno", "deno", "deno 2.1.4")
            .on_run_installing("install.ps1", "deno", "deno 2.1.4");
        let host = HostProfile::new(OsFamily::Windows, Privilege::Root)
            .with_package_manager(PackageManager::Chocolatey)
            .with_package_manager(PackageManager::Scoop);
        let executor = Executor::new(&runner, &host);
        let mut ui = MockUI::new();

        let strategies = resolve(&spec("deno"), &host);
        let outcome = executor.execute(&spec("deno"), &strategies, &mut EnvironmentOverlay::default(), &mut ui);

        assert_eq!(outcome.status, OutcomeStatus::Installed);
        assert!(outcome.detail.contains("scoop"));
        assert_eq!(runner.runs().len(), 2);
        assert!(!runner.has_run("install.ps1"));
    }

    #[test]
    fn exhausted_required_dependency_fails() {
        let runner = MockRunner::new();
        let host = HostProfile::new(OsFamily::Linux, Privilege::Unprivileged)
            .with_linux_pkg_manager(LinuxPackageManager::Apt);
        let executor = Executor::new(&runner, &host);
        let mut ui = MockUI::new();

        let strategies = resolve(&spec("mpv"), &host);
        let outcome = executor.execute(&spec("mpv"), &strategies, &mut EnvironmentOverlay::default(), &mut ui);

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert!(outcome.is_fatal());
        assert!(outcome.detail.contains("needs root"));
        assert!(runner.runs().is_empty());
    }

    #[test]
    fn exhausted_optional_dependency_is_skipped() {
        let runner = MockRunner::new().on_run("install.sh", 22);
        let host = HostProfile::new(OsFamily::Linux, Privilege::Unprivileged);
        let executor = Executor::new(&runner, &host);
        let mut ui = MockUI::new();

        let strategies = resolve(&spec("deno"), &host);
        let outcome = executor.execute(&spec("deno"), &strategies, &mut EnvironmentOverlay::default(), &mut ui);

        assert_eq!(outcome.status, OutcomeStatus::SkippedOptional);
        assert!(!outcome.is_fatal());
        assert!(ui.has_warning("status 22"));
    }
}
