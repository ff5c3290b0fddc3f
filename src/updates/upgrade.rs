//! Upgrading the target package in place.

use crate::environment::HostProfile;
use crate::requirements::{
    resolve_upgrade, DependencySpec, EnvironmentOverlay, Executor, Interpreter, Outcome,
    OutcomeStatus,
};
use crate::shell::CommandRunner;
use crate::ui::UserInterface;

/// Upgrade `spec` with the host's package manager.
///
/// Only Python distributions can be upgraded; anything else fails without
/// running a command. pip upgrades run through `interpreter`.
pub fn upgrade(
    spec: &DependencySpec,
    host: &HostProfile,
    interpreter: &Interpreter,
    runner: &dyn CommandRunner,
    overlay: &mut EnvironmentOverlay,
    ui: &mut dyn UserInterface,
) -> Outcome {
    let Some(distribution) = spec.python_distribution() else {
        return Outcome::new(
            &spec.name,
            spec.required,
            OutcomeStatus::Failed,
            "only Python packages can be upgraded",
        );
    };

    let strategies = resolve_upgrade(host, interpreter, distribution);
    Executor::new(runner, host).execute(spec, &strategies, overlay, ui)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{OsFamily, PackageManager, Privilege};
    use crate::requirements::{DependencyRegistry, Scanner};
    use crate::shell::MockRunner;
    use crate::ui::MockUI;

    #[test]
    fn upgrades_with_pipx_when_present() {
        let runner = MockRunner::new()
            .with_tool("python3", "Python 3.12.1")
            .with_tool("pipx", "1.7.1")
            .on_run_installing_module("pipx upgrade wrkmon", "python3", "wrkmon", "1.5.0");
        let host = HostProfile::new(OsFamily::Linux, Privilege::Unprivileged)
            .with_package_manager(PackageManager::Pipx);
        let registry = DependencyRegistry::new();
        let spec = registry.get("wrkmon").unwrap();
        let mut ui = MockUI::new();

        let interp = Interpreter::default_for(host.os_family);

        let outcome = upgrade(
            spec,
            &host,
            &interp,
            &runner,
            &mut EnvironmentOverlay::default(),
            &mut ui,
        );

        assert_eq!(outcome.status, OutcomeStatus::Installed);
        assert!(runner.has_run("pipx upgrade wrkmon"));
    }

    #[test]
    fn falls_back_to_pip_user_upgrade() {
        let runner = MockRunner::new()
            .with_tool("python3", "Python 3.12.1")
            .on_run_installing_module(
                "python3 -m pip install --user --upgrade wrkmon",
                "python3",
                "wrkmon",
                "1.5.0",
            );
        let host = HostProfile::new(OsFamily::MacOs, Privilege::Unprivileged);
        let registry = DependencyRegistry::new();
        let spec = registry.get("wrkmon").unwrap();
        let mut ui = MockUI::new();

        let interp = Interpreter::default_for(host.os_family);

        let outcome = upgrade(
            spec,
            &host,
            &interp,
            &runner,
            &mut EnvironmentOverlay::default(),
            &mut ui,
        );

        assert_eq!(outcome.status, OutcomeStatus::Installed);
    }

    #[test]
    fn pip_upgrade_uses_the_found_interpreter() {
        let runner = MockRunner::new()
            .with_tool("python", "Python 3.11.4")
            .on_run_installing_module(
                "python -m pip install --user --upgrade wrkmon",
                "python",
                "wrkmon",
                "1.5.0",
            );
        let host = HostProfile::new(OsFamily::Linux, Privilege::Unprivileged);
        let registry = DependencyRegistry::new();
        let overlay = EnvironmentOverlay::default();
        let interp = Scanner::new(&runner)
            .interpreter(registry.python().unwrap(), &overlay)
            .unwrap();
        let mut ui = MockUI::new();

        let outcome = upgrade(
            registry.get("wrkmon").unwrap(),
            &host,
            &interp,
            &runner,
            &mut overlay.clone(),
            &mut ui,
        );

        assert_eq!(outcome.status, OutcomeStatus::Installed);
        assert!(!runner.has_run("python3"));
    }

    #[test]
    fn binary_dependencies_are_not_upgraded() {
        let runner = MockRunner::new();
        let host = HostProfile::new(OsFamily::Linux, Privilege::Root);
        let registry = DependencyRegistry::new();
        let mut ui = MockUI::new();

        let outcome = upgrade(
            registry.get("mpv").unwrap(),
            &host,
            &Interpreter::default_for(host.os_family),
            &runner,
            &mut EnvironmentOverlay::default(),
            &mut ui,
        );

        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert!(runner.runs().is_empty());
    }
}
