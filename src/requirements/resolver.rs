//! Strategy resolution.
//!
//! Turns a dependency and a host profile into an ordered list of
//! [`Strategy`] values. Resolution is a pure function of its inputs: the
//! same dependency on the same profile always yields the same list.
//!
//! Tiers, in order:
//!
//! 1. The host's first-party manager (winget, the Linux manager, Homebrew,
//!    FreeBSD `pkg`, or pipx for Python packages), if present and carrying
//!    the dependency.
//! 2. Secondary managers, only when no first-party manager can deliver.
//! 3. The vendor's install script, only when no package manager can deliver.
//! 4. Manual instructions, always last.

use std::path::PathBuf;

use crate::environment::{HostProfile, LinuxPackageManager, OsFamily, PackageManager};
use crate::requirements::overlay::EnvironmentOverlay;
use crate::shell::Invocation;

use super::checker::Scanner;
use super::registry::{DependencySpec, Interpreter};
use super::status::InstalledVersion;
use super::strategy::{Strategy, StrategyKind};

/// Where user-level Python installs put console scripts.
const USER_BIN: &str = ".local/bin";

/// What to do about one dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Nothing to install. `by` names the dependency or alternative found.
    AlreadySatisfied {
        by: String,
        found: InstalledVersion,
    },
    /// Try these strategies in order.
    Install(Vec<Strategy>),
}

/// Scan first; resolve only when nothing satisfies the dependency.
///
/// `interpreter` is the Python the scanner confirmed, if any. Without one,
/// pip strategies use the platform's conventional launcher.
pub fn plan(
    spec: &DependencySpec,
    host: &HostProfile,
    scanner: &Scanner<'_>,
    overlay: &EnvironmentOverlay,
    interpreter: Option<&Interpreter>,
) -> Plan {
    match scanner.satisfied_by(spec, overlay) {
        Some((by, found)) => Plan::AlreadySatisfied { by, found },
        None => Plan::Install(match interpreter {
            Some(interp) => resolve_for(spec, host, interp),
            None => resolve(spec, host),
        }),
    }
}

/// Ordered install strategies for `spec` on `host`. Never empty.
pub fn resolve(spec: &DependencySpec, host: &HostProfile) -> Vec<Strategy> {
    resolve_for(spec, host, &Interpreter::default_for(host.os_family))
}

/// Like [`resolve`], with pip strategies run by `interpreter`.
pub fn resolve_for(
    spec: &DependencySpec,
    host: &HostProfile,
    interpreter: &Interpreter,
) -> Vec<Strategy> {
    let mut strategies = primary(spec, host);

    if strategies.is_empty() {
        strategies = secondary(spec, host, interpreter);
    }

    if strategies.is_empty() {
        strategies.extend(vendor_script(spec, host));
    }

    let advice = spec.manual.for_os(host.os_family);
    strategies.push(Strategy::advice(&advice.instructions, advice.url.clone()));

    strategies
}

/// Strategies that upgrade an installed Python package.
pub fn resolve_upgrade(
    host: &HostProfile,
    interpreter: &Interpreter,
    distribution: &str,
) -> Vec<Strategy> {
    let mut strategies = Vec::new();
    if host.has(PackageManager::Pipx) {
        strategies.push(
            Strategy::command(
                StrategyKind::PrimaryPkgMgr,
                "pipx",
                Invocation::new("pipx", ["upgrade", distribution]),
                false,
            )
            .with_path_additions([USER_BIN]),
        );
    } else {
        strategies.push(
            Strategy::command(
                StrategyKind::SecondaryPkgMgr,
                "pip",
                interpreter.invocation(["-m", "pip", "install", "--user", "--upgrade", distribution]),
                false,
            )
            .with_path_additions(user_bin(host)),
        );
    }
    strategies.push(Strategy::advice(
        format!("Run: pip install --upgrade {}", distribution),
        Some(format!("https://pypi.org/project/{}/", distribution)),
    ));
    strategies
}

fn primary(spec: &DependencySpec, host: &HostProfile) -> Vec<Strategy> {
    if let Some(distribution) = spec.python_distribution() {
        if !host.has(PackageManager::Pipx) {
            return Vec::new();
        }
        return vec![Strategy::command(
            StrategyKind::PrimaryPkgMgr,
            "pipx",
            Invocation::new("pipx", ["install", distribution]),
            false,
        )
        .with_path_additions([USER_BIN])];
    }

    let strategy = match host.os_family {
        OsFamily::Linux | OsFamily::Wsl => host.linux_pkg_manager.and_then(|pm| {
            spec.packages
                .for_linux(pm)
                .map(|pkg| linux_install(pm, pkg))
        }),
        OsFamily::Windows => manager_install(spec, host, PackageManager::Winget, StrategyKind::PrimaryPkgMgr),
        OsFamily::MacOs => manager_install(spec, host, PackageManager::Homebrew, StrategyKind::PrimaryPkgMgr),
        OsFamily::FreeBsd => manager_install(spec, host, PackageManager::Pkg, StrategyKind::PrimaryPkgMgr),
        OsFamily::Unknown => None,
    };
    strategy.into_iter().collect()
}

fn secondary(spec: &DependencySpec, host: &HostProfile, interpreter: &Interpreter) -> Vec<Strategy> {
    if let Some(distribution) = spec.python_distribution() {
        return vec![Strategy::command(
            StrategyKind::SecondaryPkgMgr,
            "pip",
            interpreter.invocation(["-m", "pip", "install", "--user", distribution]),
            false,
        )
        .with_path_additions(user_bin(host))];
    }

    let managers: &[PackageManager] = match host.os_family {
        OsFamily::Windows => &[PackageManager::Chocolatey, PackageManager::Scoop],
        OsFamily::MacOs => &[PackageManager::MacPorts],
        OsFamily::Linux | OsFamily::Wsl => &[PackageManager::Snap],
        OsFamily::FreeBsd | OsFamily::Unknown => &[],
    };
    managers
        .iter()
        .filter_map(|pm| manager_install(spec, host, *pm, StrategyKind::SecondaryPkgMgr))
        .collect()
}

fn vendor_script(spec: &DependencySpec, host: &HostProfile) -> Option<Strategy> {
    let script = spec.vendor_script.as_ref()?;
    let (body, windows) = match host.os_family {
        OsFamily::Windows => (script.windows.as_ref()?, true),
        OsFamily::Linux | OsFamily::Wsl | OsFamily::MacOs => (script.unix.as_ref()?, false),
        OsFamily::FreeBsd | OsFamily::Unknown => return None,
    };
    Some(
        Strategy::shell(format!("{} install script", spec.name), body, windows)
            .with_path_additions(script.path_additions.iter().cloned()),
    )
}

fn manager_install(
    spec: &DependencySpec,
    host: &HostProfile,
    manager: PackageManager,
    kind: StrategyKind,
) -> Option<Strategy> {
    if !host.has(manager) {
        return None;
    }
    let pkg = spec.packages.for_manager(manager)?;
    let args: Vec<String> = match manager {
        PackageManager::Winget => vec![
            "install".into(),
            "--id".into(),
            pkg.into(),
            "-e".into(),
            "--silent".into(),
            "--accept-package-agreements".into(),
            "--accept-source-agreements".into(),
        ],
        PackageManager::Chocolatey => vec!["install".into(), pkg.into(), "-y".into()],
        PackageManager::Pkg => vec!["install".into(), "-y".into(), pkg.into()],
        PackageManager::Scoop
        | PackageManager::Homebrew
        | PackageManager::MacPorts
        | PackageManager::Snap
        | PackageManager::Pipx => vec!["install".into(), pkg.into()],
    };

    let mut strategy = Strategy::command(
        kind,
        manager.name(),
        Invocation::new(manager.binary(), args),
        manager.requires_privilege(),
    );
    if manager == PackageManager::Snap {
        strategy = strategy.with_path_additions([PathBuf::from("/snap/bin")]);
    }
    Some(strategy)
}

fn linux_install(manager: LinuxPackageManager, pkg: &str) -> Strategy {
    let args: Vec<String> = match manager {
        LinuxPackageManager::Apt => vec!["install".into(), "-y".into(), pkg.into()],
        LinuxPackageManager::Dnf => vec!["install".into(), "-y".into(), pkg.into()],
        LinuxPackageManager::Pacman => {
            vec!["-S".into(), "--noconfirm".into(), "--needed".into(), pkg.into()]
        }
        LinuxPackageManager::Zypper => {
            vec!["--non-interactive".into(), "install".into(), pkg.into()]
        }
        LinuxPackageManager::Apk => vec!["add".into(), pkg.into()],
        LinuxPackageManager::Portage => vec!["--noreplace".into(), pkg.into()],
        LinuxPackageManager::Xbps => vec!["-Sy".into(), pkg.into()],
        LinuxPackageManager::Nix => vec!["-iA".into(), format!("nixpkgs.{}", pkg)],
    };

    let strategy = Strategy::command(
        StrategyKind::PrimaryPkgMgr,
        manager.name(),
        Invocation::new(manager.binary(), args),
        manager.requires_privilege(),
    );
    if manager == LinuxPackageManager::Nix {
        strategy.with_path_additions([".nix-profile/bin"])
    } else {
        strategy
    }
}

fn user_bin(host: &HostProfile) -> Vec<PathBuf> {
    if host.os_family == OsFamily::Windows {
        Vec::new()
    } else {
        vec![PathBuf::from(USER_BIN)]
    }
}
