//! Dependency registry and definitions.
//!
//! Defines what the bootstrap installs, how each dependency is detected,
//! and what every package manager calls it. The table is static apart from
//! the target package and interpreter minimum, which come from config.

use semver::Version;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::SetupConfig;
use crate::environment::{LinuxPackageManager, OsFamily, PackageManager};
use crate::shell::Invocation;

use super::checker::parse_version;
use super::status::InstalledVersion;

/// A program plus the arguments that make it print its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionQuery {
    pub program: String,
    pub args: Vec<String>,
}

impl VersionQuery {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Arguments that select the program itself (`-3` in `py -3 --version`).
    pub fn launcher_args(&self) -> Vec<String> {
        self.args
            .iter()
            .take_while(|a| a.as_str() != "--version" && a.as_str() != "-c")
            .cloned()
            .collect()
    }
}

/// How to tell whether a dependency is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// First candidate on the search path whose query exits 0 wins.
    Binary { candidates: Vec<VersionQuery> },
    /// Import a module with the interpreter and print the distribution version.
    PythonModule { distribution: String, module: String },
}

/// Another dependency that satisfies the same need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub name: String,
    pub detection: Detection,
}

/// Package names per manager. A missing entry means the manager does not
/// carry the dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageNames {
    pub linux: BTreeMap<LinuxPackageManager, String>,
    pub other: BTreeMap<PackageManager, String>,
}

impl PackageNames {
    fn linux(mut self, manager: LinuxPackageManager, name: &str) -> Self {
        self.linux.insert(manager, name.to_string());
        self
    }

    fn other(mut self, manager: PackageManager, name: &str) -> Self {
        self.other.insert(manager, name.to_string());
        self
    }

    pub fn for_linux(&self, manager: LinuxPackageManager) -> Option<&str> {
        self.linux.get(&manager).map(String::as_str)
    }

    pub fn for_manager(&self, manager: PackageManager) -> Option<&str> {
        self.other.get(&manager).map(String::as_str)
    }
}

/// A vendor-provided installer script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorScript {
    /// Script for `sh` (Linux, WSL, macOS).
    pub unix: Option<String>,
    /// Script for PowerShell (Windows).
    pub windows: Option<String>,
    /// Where the script puts the binary, relative to home.
    pub path_additions: Vec<PathBuf>,
}

/// Manual install instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advice {
    pub instructions: String,
    pub url: Option<String>,
}

impl Advice {
    fn new(instructions: &str, url: Option<&str>) -> Self {
        Self {
            instructions: instructions.to_string(),
            url: url.map(String::from),
        }
    }
}

/// Advice per OS family with a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualAdvice {
    pub default: Advice,
    pub per_os: BTreeMap<OsFamily, Advice>,
}

impl ManualAdvice {
    fn new(default: Advice) -> Self {
        Self {
            default,
            per_os: BTreeMap::new(),
        }
    }

    fn on(mut self, os: OsFamily, advice: Advice) -> Self {
        self.per_os.insert(os, advice);
        self
    }

    pub fn for_os(&self, os: OsFamily) -> &Advice {
        self.per_os.get(&os).unwrap_or(&self.default)
    }
}

/// A dependency definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySpec {
    /// Dependency name (e.g., "python", "mpv")
    pub name: String,
    /// One-line description for display
    pub description: String,
    /// Whether a failure aborts the run
    pub required: bool,
    /// Lowest acceptable version
    pub min_version: Option<Version>,
    /// How to detect the dependency itself
    pub detection: Detection,
    /// Other tools that satisfy the same need (OR-group)
    pub alternatives: Vec<Alternative>,
    /// Names in each package manager
    pub packages: PackageNames,
    /// Installer script from the vendor
    pub vendor_script: Option<VendorScript>,
    /// Last-resort instructions
    pub manual: ManualAdvice,
}

impl DependencySpec {
    /// Whether this dependency is a Python distribution.
    pub fn python_distribution(&self) -> Option<&str> {
        match &self.detection {
            Detection::PythonModule { distribution, .. } => Some(distribution),
            Detection::Binary { .. } => None,
        }
    }
}

/// Name of the interpreter dependency.
pub const PYTHON: &str = "python";

/// Interpreter candidates, in lookup order.
pub fn interpreter_candidates() -> Vec<VersionQuery> {
    vec![
        VersionQuery::new("python3", &["--version"]),
        VersionQuery::new("python", &["--version"]),
        VersionQuery::new("py", &["-3", "--version"]),
    ]
}

/// The Python interpreter that `-m pip` style strategies run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub program: String,
    pub args: Vec<String>,
}

impl Interpreter {
    /// The conventional launcher when no interpreter has been found yet.
    pub fn default_for(os: OsFamily) -> Self {
        match os {
            OsFamily::Windows => Self {
                program: "py".to_string(),
                args: vec!["-3".to_string()],
            },
            _ => Self {
                program: "python3".to_string(),
                args: Vec::new(),
            },
        }
    }

    /// The exact interpreter a scan confirmed.
    pub fn from_found(found: &InstalledVersion) -> Self {
        Self {
            program: found.path.to_string_lossy().into_owned(),
            args: found.launcher_args.clone(),
        }
    }

    /// Invocation of `program [args] <extra...>`.
    pub fn invocation<I, S>(&self, extra: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = self
            .args
            .iter()
            .cloned()
            .chain(extra.into_iter().map(Into::into));
        Invocation::new(&self.program, args.collect::<Vec<String>>())
    }
}

/// Default minimum interpreter version.
fn default_python_min() -> Version {
    Version::new(3, 10, 0)
}

/// Ordered set of dependencies the bootstrap works through.
#[derive(Debug, Clone)]
pub struct DependencyRegistry {
    specs: Vec<DependencySpec>,
}

impl DependencyRegistry {
    /// Create a registry with the built-in defaults.
    pub fn new() -> Self {
        Self::from_config(&SetupConfig::default())
    }

    /// Create a registry using the package and interpreter settings from config.
    pub fn from_config(config: &SetupConfig) -> Self {
        let python_min = parse_version(&config.python.min_version).unwrap_or_else(|| {
            tracing::warn!(
                "ignoring unparseable python.min_version '{}'",
                config.python.min_version
            );
            default_python_min()
        });

        Self {
            specs: vec![
                python(python_min),
                mpv(),
                deno(),
                target_package(&config.package.name, &config.package.module),
            ],
        }
    }

    /// Dependencies in run order.
    pub fn specs(&self) -> &[DependencySpec] {
        &self.specs
    }

    /// Get a dependency by name.
    pub fn get(&self, name: &str) -> Option<&DependencySpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// The interpreter dependency.
    pub fn python(&self) -> Option<&DependencySpec> {
        self.get(PYTHON)
    }

    /// Names in run order.
    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name.as_str()).collect()
    }
}

impl Default for DependencyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn python(min_version: Version) -> DependencySpec {
    use LinuxPackageManager::*;
    use PackageManager::*;

    DependencySpec {
        name: PYTHON.to_string(),
        description: "Python interpreter".to_string(),
        required: true,
        min_version: Some(min_version),
        detection: Detection::Binary {
            candidates: interpreter_candidates(),
        },
        alternatives: vec![],
        packages: PackageNames::default()
            .linux(Apt, "python3")
            .linux(Dnf, "python3")
            .linux(Pacman, "python")
            .linux(Zypper, "python3")
            .linux(Apk, "python3")
            .linux(Portage, "dev-lang/python")
            .linux(Xbps, "python3")
            .linux(Nix, "python3")
            .other(Winget, "Python.Python.3.12")
            .other(Chocolatey, "python")
            .other(Scoop, "python")
            .other(Homebrew, "python@3.12")
            .other(MacPorts, "python312")
            .other(Pkg, "python3"),
        vendor_script: None,
        manual: ManualAdvice::new(Advice::new(
            "Install Python 3.10 or newer from python.org",
            Some("https://www.python.org/downloads/"),
        ))
        .on(
            OsFamily::Windows,
            Advice::new(
                "Download the Python installer and tick \"Add python.exe to PATH\"",
                Some("https://www.python.org/downloads/windows/"),
            ),
        ),
    }
}

fn mpv() -> DependencySpec {
    use LinuxPackageManager::*;
    use PackageManager::*;

    DependencySpec {
        name: "mpv".to_string(),
        description: "mpv media player (audio backend)".to_string(),
        required: true,
        min_version: None,
        detection: Detection::Binary {
            candidates: vec![VersionQuery::new("mpv", &["--version"])],
        },
        alternatives: vec![],
        packages: PackageNames::default()
            .linux(Apt, "mpv")
            .linux(Dnf, "mpv")
            .linux(Pacman, "mpv")
            .linux(Zypper, "mpv")
            .linux(Apk, "mpv")
            .linux(Portage, "media-video/mpv")
            .linux(Xbps, "mpv")
            .linux(Nix, "mpv")
            .other(Winget, "mpv")
            .other(Chocolatey, "mpv")
            .other(Scoop, "extras/mpv")
            .other(Homebrew, "mpv")
            .other(MacPorts, "mpv")
            .other(Pkg, "mpv"),
        vendor_script: None,
        manual: ManualAdvice::new(Advice::new(
            "Install mpv with your system package manager",
            Some("https://mpv.io/installation/"),
        ))
        .on(
            OsFamily::Windows,
            Advice::new(
                "Download an mpv build, extract it, and add the folder containing mpv.exe to PATH",
                Some("https://mpv.io/installation/"),
            ),
        )
        .on(
            OsFamily::MacOs,
            Advice::new(
                "Install Homebrew, then run: brew install mpv",
                Some("https://brew.sh"),
            ),
        ),
    }
}

fn deno() -> DependencySpec {
    use LinuxPackageManager::*;
    use PackageManager::*;

    DependencySpec {
        name: "deno".to_string(),
        description: "JavaScript runtime for stream extraction".to_string(),
        required: false,
        min_version: None,
        detection: Detection::Binary {
            candidates: vec![VersionQuery::new("deno", &["--version"])],
        },
        alternatives: vec![Alternative {
            name: "node".to_string(),
            detection: Detection::Binary {
                candidates: vec![VersionQuery::new("node", &["--version"])],
            },
        }],
        packages: PackageNames::default()
            .linux(Pacman, "deno")
            .linux(Apk, "deno")
            .linux(Xbps, "deno")
            .linux(Nix, "deno")
            .other(Winget, "DenoLand.Deno")
            .other(Chocolatey, "deno")
            .other(Scoop, "deno")
            .other(Homebrew, "deno")
            .other(MacPorts, "deno")
            .other(Snap, "deno")
            .other(Pkg, "deno"),
        vendor_script: Some(VendorScript {
            unix: Some("curl -fsSL https://deno.land/install.sh | sh".to_string()),
            windows: Some("irm https://deno.land/install.ps1 | iex".to_string()),
            path_additions: vec![PathBuf::from(".deno/bin")],
        }),
        manual: ManualAdvice::new(Advice::new(
            "Install Deno (or Node.js) manually",
            Some("https://docs.deno.com/runtime/getting_started/installation/"),
        )),
    }
}

fn target_package(distribution: &str, module: &str) -> DependencySpec {
    DependencySpec {
        name: distribution.to_string(),
        description: format!("{} Python package", distribution),
        required: true,
        min_version: None,
        detection: Detection::PythonModule {
            distribution: distribution.to_string(),
            module: module.to_string(),
        },
        alternatives: vec![],
        packages: PackageNames::default(),
        vendor_script: None,
        manual: ManualAdvice::new(Advice::new(
            &format!("Run: python3 -m pip install --user {}", distribution),
            Some(&format!("https://pypi.org/project/{}/", distribution)),
        ))
        .on(
            OsFamily::Windows,
            Advice::new(
                &format!("Run: py -3 -m pip install --user {}", distribution),
                Some(&format!("https://pypi.org/project/{}/", distribution)),
            ),
        ),
    }
}
