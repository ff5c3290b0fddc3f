//! Host profile types.
//!
//! A [`HostProfile`] is built once per run by the environment probe and
//! never changes afterwards. Every later decision (which package manager,
//! whether to prefix `sudo`, which advice to print) reads from it.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Linux,
    #[serde(rename = "macos")]
    MacOs,
    Windows,
    /// Linux kernel running under Windows Subsystem for Linux.
    Wsl,
    #[serde(rename = "freebsd")]
    FreeBsd,
    Unknown,
}

impl OsFamily {
    /// Whether Linux package managers apply (Linux and WSL).
    pub fn uses_linux_packages(self) -> bool {
        matches!(self, OsFamily::Linux | OsFamily::Wsl)
    }

    /// Every family, in a fixed order.
    pub fn all() -> [OsFamily; 6] {
        [
            OsFamily::Linux,
            OsFamily::MacOs,
            OsFamily::Windows,
            OsFamily::Wsl,
            OsFamily::FreeBsd,
            OsFamily::Unknown,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            OsFamily::Linux => "linux",
            OsFamily::MacOs => "macos",
            OsFamily::Windows => "windows",
            OsFamily::Wsl => "wsl",
            OsFamily::FreeBsd => "freebsd",
            OsFamily::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Privilege level of the current process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Privilege {
    /// Effective uid 0 (or an elevated Windows session).
    Root,
    /// Not root, but `sudo` or `doas` is on the search path.
    ElevatedAvailable,
    /// Not root and no elevation helper.
    Unprivileged,
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Privilege::Root => "root",
            Privilege::ElevatedAvailable => "elevated-available",
            Privilege::Unprivileged => "unprivileged",
        })
    }
}

/// Program used to run privileged commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationHelper {
    Sudo,
    Doas,
}

impl ElevationHelper {
    pub fn program(self) -> &'static str {
        match self {
            ElevationHelper::Sudo => "sudo",
            ElevationHelper::Doas => "doas",
        }
    }
}

/// Native Linux package managers, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinuxPackageManager {
    Apt,
    Dnf,
    Pacman,
    Zypper,
    Apk,
    Portage,
    Xbps,
    Nix,
}

impl LinuxPackageManager {
    /// All managers in detection order.
    pub const ALL: [LinuxPackageManager; 8] = [
        LinuxPackageManager::Apt,
        LinuxPackageManager::Dnf,
        LinuxPackageManager::Pacman,
        LinuxPackageManager::Zypper,
        LinuxPackageManager::Apk,
        LinuxPackageManager::Portage,
        LinuxPackageManager::Xbps,
        LinuxPackageManager::Nix,
    ];

    /// The binary whose presence identifies this manager.
    pub fn binary(self) -> &'static str {
        match self {
            LinuxPackageManager::Apt => "apt-get",
            LinuxPackageManager::Dnf => "dnf",
            LinuxPackageManager::Pacman => "pacman",
            LinuxPackageManager::Zypper => "zypper",
            LinuxPackageManager::Apk => "apk",
            LinuxPackageManager::Portage => "emerge",
            LinuxPackageManager::Xbps => "xbps-install",
            LinuxPackageManager::Nix => "nix-env",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LinuxPackageManager::Apt => "apt",
            LinuxPackageManager::Dnf => "dnf",
            LinuxPackageManager::Pacman => "pacman",
            LinuxPackageManager::Zypper => "zypper",
            LinuxPackageManager::Apk => "apk",
            LinuxPackageManager::Portage => "portage",
            LinuxPackageManager::Xbps => "xbps",
            LinuxPackageManager::Nix => "nix",
        }
    }

    /// Whether installs need root. Nix profiles are per-user.
    pub fn requires_privilege(self) -> bool {
        !matches!(self, LinuxPackageManager::Nix)
    }
}

impl fmt::Display for LinuxPackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Package managers other than the native Linux ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Winget,
    Chocolatey,
    Scoop,
    Homebrew,
    MacPorts,
    Snap,
    /// FreeBSD `pkg`.
    Pkg,
    Pipx,
}

impl PackageManager {
    pub const ALL: [PackageManager; 8] = [
        PackageManager::Winget,
        PackageManager::Chocolatey,
        PackageManager::Scoop,
        PackageManager::Homebrew,
        PackageManager::MacPorts,
        PackageManager::Snap,
        PackageManager::Pkg,
        PackageManager::Pipx,
    ];

    pub fn binary(self) -> &'static str {
        match self {
            PackageManager::Winget => "winget",
            PackageManager::Chocolatey => "choco",
            PackageManager::Scoop => "scoop",
            PackageManager::Homebrew => "brew",
            PackageManager::MacPorts => "port",
            PackageManager::Snap => "snap",
            PackageManager::Pkg => "pkg",
            PackageManager::Pipx => "pipx",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PackageManager::Winget => "winget",
            PackageManager::Chocolatey => "chocolatey",
            PackageManager::Scoop => "scoop",
            PackageManager::Homebrew => "homebrew",
            PackageManager::MacPorts => "macports",
            PackageManager::Snap => "snap",
            PackageManager::Pkg => "pkg",
            PackageManager::Pipx => "pipx",
        }
    }

    /// Whether installs need an administrator.
    pub fn requires_privilege(self) -> bool {
        matches!(
            self,
            PackageManager::Chocolatey
                | PackageManager::MacPorts
                | PackageManager::Snap
                | PackageManager::Pkg
        )
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Detected, immutable description of the current machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostProfile {
    /// Operating system family.
    pub os_family: OsFamily,
    /// CPU architecture (e.g. `x86_64`, `aarch64`).
    pub arch: String,
    /// Privilege level.
    pub privilege: Privilege,
    /// Native Linux package manager, if any (Linux and WSL only).
    pub linux_pkg_manager: Option<LinuxPackageManager>,
    /// Helper used to elevate privileged commands.
    pub elevation: Option<ElevationHelper>,
    /// Other package managers found on the search path.
    pub package_managers: BTreeSet<PackageManager>,
}

impl HostProfile {
    /// A profile with no package managers, for building test fixtures.
    pub fn new(os_family: OsFamily, privilege: Privilege) -> Self {
        let elevation = match privilege {
            Privilege::ElevatedAvailable => Some(ElevationHelper::Sudo),
            _ => None,
        };
        Self {
            os_family,
            arch: std::env::consts::ARCH.to_string(),
            privilege,
            linux_pkg_manager: None,
            elevation,
            package_managers: BTreeSet::new(),
        }
    }

    /// Set the native Linux package manager.
    pub fn with_linux_pkg_manager(mut self, manager: LinuxPackageManager) -> Self {
        self.linux_pkg_manager = Some(manager);
        self
    }

    /// Add an available package manager.
    pub fn with_package_manager(mut self, manager: PackageManager) -> Self {
        self.package_managers.insert(manager);
        self
    }

    /// Whether `manager` was found on this host.
    pub fn has(&self, manager: PackageManager) -> bool {
        self.package_managers.contains(&manager)
    }

    /// Whether privileged strategies can run at all.
    pub fn can_elevate(&self) -> bool {
        !matches!(self.privilege, Privilege::Unprivileged)
    }
}

impl fmt::Display for HostProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}), {}", self.os_family, self.arch, self.privilege)?;
        if let Some(pm) = self.linux_pkg_manager {
            write!(f, ", {}", pm)?;
        }
        Ok(())
    }
}
