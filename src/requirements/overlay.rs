//! Explicit search-path overlay.
//!
//! Tools installed by user-level installers (the deno install script,
//! `pipx`, `pip --user`) land in directories that are frequently missing
//! from `PATH` in the shell that launched us. Instead of mutating the
//! process environment, the orchestrator carries an [`EnvironmentOverlay`]:
//! a list of directories prepended to the system `PATH`. Every lookup and
//! every spawned child uses the overlay, so a tool installed by one step
//! is visible to the next without restarting the shell.
//!
//! # Example
//!
//! ```no_run
//! use wrkmon_setup::requirements::overlay::EnvironmentOverlay;
//!
//! let mut overlay = EnvironmentOverlay::discover();
//! overlay.prepend_home_relative(".deno/bin");
//! if let Some(path) = overlay.which("deno") {
//!     println!("deno at {}", path.display());
//! }
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Directories (relative to home) where user-level installers put binaries.
const HOME_TOOL_DIRS: &[&str] = &[".deno/bin", ".local/bin"];

/// Search path used for lookups and child processes.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentOverlay {
    /// Entries prepended to the system PATH, most recent first.
    prepended: Vec<PathBuf>,
    /// The system PATH captured at construction.
    system: Vec<PathBuf>,
    /// Home directory used to resolve home-relative additions.
    home: Option<PathBuf>,
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// File names to try for `tool` on this platform.
fn candidate_names(tool: &str) -> Vec<String> {
    if cfg!(windows) && Path::new(tool).extension().is_none() {
        ["exe", "cmd", "bat"]
            .iter()
            .map(|ext| format!("{}.{}", tool, ext))
            .collect()
    } else {
        vec![tool.to_string()]
    }
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that exists and is executable. Does NOT use
/// the `which` command, which is sometimes a shell builtin with
/// inconsistent error handling.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    let names = candidate_names(tool);
    for dir in path_entries {
        for name in &names {
            let candidate = dir.join(name);
            if candidate.is_file() && is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

/// Default Homebrew prefix bin directories (absolute, not relative to home).
fn homebrew_default_bins() -> Vec<PathBuf> {
    let mut bins = Vec::new();
    if cfg!(target_os = "macos") {
        if cfg!(target_arch = "aarch64") {
            bins.push(PathBuf::from("/opt/homebrew/bin"));
        } else {
            bins.push(PathBuf::from("/usr/local/bin"));
        }
    } else if cfg!(target_os = "linux") {
        bins.push(PathBuf::from("/home/linuxbrew/.linuxbrew/bin"));
    }
    bins
}

impl EnvironmentOverlay {
    /// Build an overlay from explicit parts.
    pub fn new(system: Vec<PathBuf>, home: Option<PathBuf>) -> Self {
        Self {
            prepended: Vec::new(),
            system,
            home,
        }
    }

    /// Capture the system PATH and add known install locations that exist
    /// on disk but are missing from it.
    pub fn discover() -> Self {
        let mut overlay = Self::new(parse_system_path(), dirs::home_dir());
        for rel in HOME_TOOL_DIRS {
            if let Some(dir) = overlay.home_join(rel) {
                if dir.is_dir() {
                    overlay.prepend(&dir);
                }
            }
        }
        for dir in homebrew_default_bins() {
            if dir.join("brew").is_file() {
                overlay.prepend(&dir);
            }
        }
        overlay
    }

    fn home_join(&self, rel: impl AsRef<Path>) -> Option<PathBuf> {
        self.home.as_ref().map(|h| h.join(rel))
    }

    /// Prepend a directory unless it is already on the search path.
    ///
    /// Returns `true` if the directory was added.
    pub fn prepend(&mut self, dir: &Path) -> bool {
        if self.prepended.iter().any(|p| p == dir) || self.system.iter().any(|p| p == dir) {
            return false;
        }
        tracing::debug!("search path += {}", dir.display());
        self.prepended.insert(0, dir.to_path_buf());
        true
    }

    /// Prepend a directory given relative to the home directory.
    ///
    /// Absolute paths are used as-is.
    pub fn prepend_home_relative(&mut self, rel: impl AsRef<Path>) -> bool {
        let rel = rel.as_ref();
        let dir = if rel.is_absolute() {
            Some(rel.to_path_buf())
        } else {
            self.home_join(rel)
        };
        match dir {
            Some(dir) => self.prepend(&dir),
            None => false,
        }
    }

    /// Entries added on top of the system PATH.
    pub fn additions(&self) -> &[PathBuf] {
        &self.prepended
    }

    /// Full search path: additions first, then the system PATH.
    pub fn search_path(&self) -> Vec<PathBuf> {
        let mut result = self.prepended.clone();
        result.extend(self.system.iter().cloned());
        result
    }

    /// The search path joined for a child's `PATH`.
    ///
    /// `None` when there are no additions, so children inherit `PATH`
    /// untouched.
    pub fn child_path(&self) -> Option<OsString> {
        if self.prepended.is_empty() {
            return None;
        }
        std::env::join_paths(self.search_path()).ok()
    }

    /// Locate a program on the search path.
    pub fn which(&self, tool: &str) -> Option<PathBuf> {
        let path = Path::new(tool);
        if path.is_absolute() {
            return (path.is_file() && is_executable(path)).then(|| path.to_path_buf());
        }
        resolve_tool_path(tool, &self.search_path())
    }
}
