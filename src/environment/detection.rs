//! Host environment probe.
//!
//! Probing is split in two: [`ProbeInputs::gather`] collects raw facts
//! (kernel strings, env hints, uid, which tools are on the search path) and
//! [`HostProfile::classify`] turns them into a profile. Classification is
//! pure, so every detection rule is testable without touching the host.
//!
//! # Example
//!
//! ```no_run
//! use wrkmon_setup::environment::probe;
//! use wrkmon_setup::requirements::overlay::EnvironmentOverlay;
//! use wrkmon_setup::shell::SystemRunner;
//!
//! let overlay = EnvironmentOverlay::discover();
//! let host = probe(&SystemRunner, &overlay);
//! println!("running on {}", host);
//! ```

use std::collections::BTreeSet;

use crate::error::SetupError;
use crate::requirements::overlay::EnvironmentOverlay;
use crate::shell::{effective_uid, CommandRunner, Invocation};

use super::profile::{
    ElevationHelper, HostProfile, LinuxPackageManager, OsFamily, PackageManager, Privilege,
};

/// Where the Linux kernel publishes its release string.
const OSRELEASE_PATH: &str = "/proc/sys/kernel/osrelease";

/// Integrity-level SIDs carried by an elevated Windows token (high, system).
const ELEVATED_SIDS: [&str; 2] = ["S-1-16-12288", "S-1-16-16384"];

/// Raw facts collected from the host.
#[derive(Debug, Clone, Default)]
pub struct ProbeInputs {
    /// `uname -s` output.
    pub kernel_name: Option<String>,
    /// Kernel release (`/proc/sys/kernel/osrelease` or `uname -r`).
    pub kernel_release: Option<String>,
    /// `uname -m` output.
    pub machine: Option<String>,
    /// `OS` environment variable (`Windows_NT` on Windows).
    pub os_env: Option<String>,
    /// `OSTYPE` environment variable.
    pub ostype_env: Option<String>,
    /// `PROCESSOR_ARCHITECTURE` environment variable (Windows).
    pub processor_env: Option<String>,
    /// Effective user id.
    pub euid: Option<u32>,
    /// Elevated Windows session (`whoami /groups` lists a high integrity level).
    pub elevated: bool,
    /// Programs of interest found on the search path.
    pub on_path: BTreeSet<String>,
}

/// Programs whose presence the probe records.
fn interesting_programs() -> Vec<&'static str> {
    let mut programs = vec!["sudo", "doas"];
    programs.extend(LinuxPackageManager::ALL.iter().map(|pm| pm.binary()));
    programs.extend(PackageManager::ALL.iter().map(|pm| pm.binary()));
    programs
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .next()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
}

impl ProbeInputs {
    /// Collect inputs from the real host.
    pub fn gather(runner: &dyn CommandRunner, overlay: &EnvironmentOverlay) -> Self {
        Self::gather_with_env(runner, overlay, |key: &str| std::env::var(key))
    }

    /// Collect inputs with a custom env var lookup function.
    ///
    /// This allows testing without modifying actual environment variables.
    pub fn gather_with_env<F>(runner: &dyn CommandRunner, overlay: &EnvironmentOverlay, env_fn: F) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let uname = |flag: &str| -> Option<String> {
            runner
                .locate("uname", overlay)
                .and_then(|_| {
                    runner
                        .capture(&Invocation::new("uname", [flag]), overlay)
                        .ok()
                })
                .filter(|r| r.success)
                .and_then(|r| first_line(&r.stdout))
        };

        let kernel_name = uname("-s");
        let kernel_release = std::fs::read_to_string(OSRELEASE_PATH)
            .ok()
            .and_then(|s| first_line(&s))
            .or_else(|| uname("-r"));
        let machine = uname("-m");

        let os_env = env_fn("OS").ok();
        let elevated = os_env
            .as_deref()
            .is_some_and(|os| os.eq_ignore_ascii_case("Windows_NT"))
            && windows_elevated(runner, overlay);

        let on_path = interesting_programs()
            .into_iter()
            .filter(|p| runner.locate(p, overlay).is_some())
            .map(String::from)
            .collect();

        Self {
            kernel_name,
            kernel_release,
            machine,
            os_env,
            ostype_env: env_fn("OSTYPE").ok(),
            processor_env: env_fn("PROCESSOR_ARCHITECTURE").ok(),
            euid: effective_uid(),
            elevated,
            on_path,
        }
    }

    fn has(&self, program: &str) -> bool {
        self.on_path.contains(program)
    }
}

/// Whether the current Windows token is elevated, from `whoami /groups`.
fn windows_elevated(runner: &dyn CommandRunner, overlay: &EnvironmentOverlay) -> bool {
    if runner.locate("whoami", overlay).is_none() {
        return false;
    }
    runner
        .capture(&Invocation::new("whoami", ["/groups"]), overlay)
        .is_ok_and(|r| r.success && ELEVATED_SIDS.iter().any(|sid| r.stdout.contains(sid)))
}

/// Probe the host. Never fails: unrecognized hosts become [`OsFamily::Unknown`].
pub fn probe(runner: &dyn CommandRunner, overlay: &EnvironmentOverlay) -> HostProfile {
    let inputs = ProbeInputs::gather(runner, overlay);
    tracing::debug!("probe inputs: {:?}", inputs);
    HostProfile::classify(&inputs)
}

/// Map a kernel identification string to an OS family.
fn family_from_kernel(kernel: &str, release: Option<&str>) -> Option<OsFamily> {
    let k = kernel.trim().to_lowercase();
    if k == "linux" {
        return Some(if release.is_some_and(is_wsl_release) {
            OsFamily::Wsl
        } else {
            OsFamily::Linux
        });
    }
    if k == "darwin" {
        return Some(OsFamily::MacOs);
    }
    if k == "freebsd" {
        return Some(OsFamily::FreeBsd);
    }
    if ["mingw", "msys", "cygwin", "windows"]
        .iter()
        .any(|p| k.starts_with(p))
    {
        return Some(OsFamily::Windows);
    }
    None
}

/// Map OS hint environment variables to an OS family.
fn family_from_hint(os_env: Option<&str>, ostype: Option<&str>) -> Option<OsFamily> {
    if os_env.is_some_and(|v| v.eq_ignore_ascii_case("Windows_NT")) {
        return Some(OsFamily::Windows);
    }
    let t = ostype?.to_lowercase();
    if t.starts_with("linux") {
        Some(OsFamily::Linux)
    } else if t.starts_with("darwin") {
        Some(OsFamily::MacOs)
    } else if t.starts_with("freebsd") {
        Some(OsFamily::FreeBsd)
    } else if t.starts_with("msys") || t.starts_with("cygwin") || t.starts_with("win") {
        Some(OsFamily::Windows)
    } else {
        None
    }
}

/// Whether a Linux kernel release string marks a WSL kernel.
pub fn is_wsl_release(release: &str) -> bool {
    let r = release.to_lowercase();
    r.contains("microsoft") || r.contains("wsl")
}

/// Normalize architecture names across `uname -m` and Windows spellings.
fn normalize_arch(raw: &str) -> String {
    match raw.trim().to_lowercase().as_str() {
        "amd64" | "x64" => "x86_64".to_string(),
        "arm64" => "aarch64".to_string(),
        other => other.to_string(),
    }
}

impl HostProfile {
    /// Classify collected inputs into a profile.
    pub fn classify(inputs: &ProbeInputs) -> Self {
        let os_family = classify_os(inputs);

        let arch = inputs
            .machine
            .as_deref()
            .or(inputs.processor_env.as_deref())
            .map(normalize_arch)
            .unwrap_or_else(|| std::env::consts::ARCH.to_string());

        let elevation = if inputs.has("sudo") {
            Some(ElevationHelper::Sudo)
        } else if inputs.has("doas") {
            Some(ElevationHelper::Doas)
        } else {
            None
        };

        let privilege = if inputs.euid == Some(0) || inputs.elevated {
            Privilege::Root
        } else if elevation.is_some() {
            Privilege::ElevatedAvailable
        } else {
            tracing::warn!(
                "not running as root and neither sudo nor doas was found; system package installs will be skipped"
            );
            Privilege::Unprivileged
        };

        let linux_pkg_manager = if os_family.uses_linux_packages() {
            LinuxPackageManager::ALL
                .into_iter()
                .find(|pm| inputs.has(pm.binary()))
        } else {
            None
        };
        if os_family.uses_linux_packages() && linux_pkg_manager.is_none() {
            tracing::warn!(
                "{}",
                SetupError::DetectionAmbiguous {
                    what: "package manager".to_string(),
                    detail: "no supported Linux package manager on the search path".to_string(),
                }
            );
        }

        let package_managers = PackageManager::ALL
            .into_iter()
            .filter(|pm| inputs.has(pm.binary()))
            // `pkg` is only FreeBSD's manager when we are on FreeBSD
            .filter(|pm| *pm != PackageManager::Pkg || os_family == OsFamily::FreeBsd)
            .collect();

        Self {
            os_family,
            arch,
            privilege,
            linux_pkg_manager,
            elevation,
            package_managers,
        }
    }
}

fn classify_os(inputs: &ProbeInputs) -> OsFamily {
    if let Some(kernel) = inputs.kernel_name.as_deref() {
        if let Some(family) = family_from_kernel(kernel, inputs.kernel_release.as_deref()) {
            tracing::debug!("os family {} from kernel '{}'", family, kernel);
            return family;
        }
    }

    if let Some(family) = family_from_hint(inputs.os_env.as_deref(), inputs.ostype_env.as_deref())
    {
        let family = if family == OsFamily::Linux
            && inputs.kernel_release.as_deref().is_some_and(is_wsl_release)
        {
            OsFamily::Wsl
        } else {
            family
        };
        tracing::debug!("os family {} from environment hint", family);
        return family;
    }

    tracing::warn!(
        "{}",
        SetupError::DetectionAmbiguous {
            what: "operating system".to_string(),
            detail: format!(
                "kernel reported {:?}, no usable OS hint",
                inputs.kernel_name.as_deref().unwrap_or("nothing")
            ),
        }
    );
    OsFamily::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::MockRunner;

    fn inputs(kernel: Option<&str>, release: Option<&str>, tools: &[&str]) -> ProbeInputs {
        ProbeInputs {
            kernel_name: kernel.map(String::from),
            kernel_release: release.map(String::from),
            machine: Some("x86_64".to_string()),
            euid: Some(1000),
            on_path: tools.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn linux_kernel_is_linux() {
        let host = HostProfile::classify(&inputs(Some("Linux"), Some("6.8.0-45-generic"), &[]));
        assert_eq!(host.os_family, OsFamily::Linux);
    }

    #[test]
    fn microsoft_kernel_release_is_wsl() {
        let host = HostProfile::classify(&inputs(
            Some("Linux"),
            Some("5.15.153.1-microsoft-standard-WSL2"),
            &["apt-get"],
        ));
        assert_eq!(host.os_family, OsFamily::Wsl);
        assert_eq!(host.linux_pkg_manager, Some(LinuxPackageManager::Apt));
    }

    #[test]
    fn darwin_kernel_is_macos() {
        let host = HostProfile::classify(&inputs(Some("Darwin"), Some("23.4.0"), &["brew"]));
        assert_eq!(host.os_family, OsFamily::MacOs);
        assert!(host.has(PackageManager::Homebrew));
        assert!(host.linux_pkg_manager.is_none());
    }

    #[test]
    fn msys_kernel_is_windows() {
        let host = HostProfile::classify(&inputs(Some("MINGW64_NT-10.0-22631"), None, &[]));
        assert_eq!(host.os_family, OsFamily::Windows);
    }

    #[test]
    fn kernel_wins_over_hint() {
        let mut i = inputs(Some("FreeBSD"), None, &[]);
        i.os_env = Some("Windows_NT".to_string());
        assert_eq!(HostProfile::classify(&i).os_family, OsFamily::FreeBsd);
    }

    #[test]
    fn missing_kernel_falls_back_to_os_hint() {
        let mut i = inputs(None, None, &["winget"]);
        i.os_env = Some("Windows_NT".to_string());
        i.processor_env = Some("AMD64".to_string());
        i.machine = None;
        let host = HostProfile::classify(&i);
        assert_eq!(host.os_family, OsFamily::Windows);
        assert_eq!(host.arch, "x86_64");
        assert!(host.has(PackageManager::Winget));
    }

    #[test]
    fn unrecognized_kernel_falls_back_to_ostype() {
        let mut i = inputs(Some("Plan9"), None, &[]);
        i.ostype_env = Some("darwin23".to_string());
        assert_eq!(HostProfile::classify(&i).os_family, OsFamily::MacOs);
    }

    #[test]
    fn nothing_recognizable_is_unknown() {
        let host = HostProfile::classify(&inputs(Some("Haiku"), None, &[]));
        assert_eq!(host.os_family, OsFamily::Unknown);
    }

    #[test]
    fn euid_zero_is_root() {
        let mut i = inputs(Some("Linux"), None, &[]);
        i.euid = Some(0);
        assert_eq!(HostProfile::classify(&i).privilege, Privilege::Root);
    }

    #[test]
    fn elevated_windows_session_is_root() {
        let mut i = inputs(None, None, &["choco"]);
        i.euid = None;
        i.os_env = Some("Windows_NT".to_string());
        i.elevated = true;
        let host = HostProfile::classify(&i);
        assert_eq!(host.os_family, OsFamily::Windows);
        assert_eq!(host.privilege, Privilege::Root);
        assert!(host.can_elevate());
    }

    #[test]
    fn sudo_on_path_is_elevated_available() {
        let host = HostProfile::classify(&inputs(Some("Linux"), None, &["sudo", "doas"]));
        assert_eq!(host.privilege, Privilege::ElevatedAvailable);
        assert_eq!(host.elevation, Some(ElevationHelper::Sudo));
    }

    #[test]
    fn doas_alone_is_used() {
        let host = HostProfile::classify(&inputs(Some("Linux"), None, &["doas"]));
        assert_eq!(host.elevation, Some(ElevationHelper::Doas));
    }

    #[test]
    fn no_helper_is_unprivileged() {
        let host = HostProfile::classify(&inputs(Some("Linux"), None, &["apt-get"]));
        assert_eq!(host.privilege, Privilege::Unprivileged);
    }

    #[test]
    fn linux_manager_priority_is_fixed() {
        let host = HostProfile::classify(&inputs(Some("Linux"), None, &["nix-env", "dnf"]));
        assert_eq!(host.linux_pkg_manager, Some(LinuxPackageManager::Dnf));
    }

    #[test]
    fn pkg_only_counts_on_freebsd() {
        let linux = HostProfile::classify(&inputs(Some("Linux"), None, &["pkg"]));
        assert!(!linux.has(PackageManager::Pkg));
        let bsd = HostProfile::classify(&inputs(Some("FreeBSD"), None, &["pkg"]));
        assert!(bsd.has(PackageManager::Pkg));
    }

    #[test]
    fn classify_is_deterministic() {
        let i = inputs(Some("Linux"), None, &["sudo", "pacman", "snap", "pipx"]);
        assert_eq!(HostProfile::classify(&i), HostProfile::classify(&i));
    }

    #[test]
    fn gather_reads_uname_and_tools_through_runner() {
        let runner = MockRunner::new()
            .with_tool("uname", "")
            .with_tool("apt-get", "apt 2.7.14 (amd64)")
            .with_tool("sudo", "Sudo version 1.9.15p5");
        let overlay = EnvironmentOverlay::default();
        let gathered = ProbeInputs::gather_with_env(&runner, &overlay, |_| {
            Err(std::env::VarError::NotPresent)
        });

        // the mock has no `-s` response, so the kernel name is unknown
        assert!(gathered.kernel_name.is_none());
        assert!(gathered.on_path.contains("apt-get"));
        assert!(gathered.on_path.contains("sudo"));
        assert!(!gathered.on_path.contains("brew"));
    }

    #[test]
    fn gather_reads_os_hint_from_env() {
        let runner = MockRunner::new();
        let overlay = EnvironmentOverlay::default();
        let gathered = ProbeInputs::gather_with_env(&runner, &overlay, |key| {
            if key == "OS" {
                Ok("Windows_NT".to_string())
            } else {
                Err(std::env::VarError::NotPresent)
            }
        });
        assert_eq!(gathered.os_env.as_deref(), Some("Windows_NT"));
        assert!(gathered.ostype_env.is_none());
    }

    fn windows_env(key: &str) -> Result<String, std::env::VarError> {
        if key == "OS" {
            Ok("Windows_NT".to_string())
        } else {
            Err(std::env::VarError::NotPresent)
        }
    }

    #[test]
    fn gather_detects_elevated_windows_token() {
        let runner = MockRunner::new().with_output(
            "whoami",
            "/groups",
            "Mandatory Label\\High Mandatory Level Label S-1-16-12288",
        );
        let overlay = EnvironmentOverlay::default();
        let gathered = ProbeInputs::gather_with_env(&runner, &overlay, windows_env);
        assert!(gathered.elevated);
    }

    #[test]
    fn gather_medium_integrity_is_not_elevated() {
        let runner = MockRunner::new().with_output(
            "whoami",
            "/groups",
            "Mandatory Label\\Medium Mandatory Level Label S-1-16-8192",
        );
        let overlay = EnvironmentOverlay::default();
        let gathered = ProbeInputs::gather_with_env(&runner, &overlay, windows_env);
        assert!(!gathered.elevated);
    }

    #[test]
    fn whoami_is_not_run_off_windows() {
        let runner = MockRunner::new().with_output("whoami", "/groups", "S-1-16-12288");
        let overlay = EnvironmentOverlay::default();
        let gathered = ProbeInputs::gather_with_env(&runner, &overlay, |_| {
            Err(std::env::VarError::NotPresent)
        });
        assert!(!gathered.elevated);
        assert!(!runner
            .captures()
            .iter()
            .any(|inv| inv.program == "whoami"));
    }
}
