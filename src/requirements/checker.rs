//! Capability scanner.
//!
//! The [`Scanner`] answers one question per dependency: is a satisfying
//! version reachable on the current search path? It never installs and
//! never fails. Missing programs, failed queries, and versions below the
//! minimum all come back as `None`.

use regex::Regex;
use semver::Version;
use std::sync::LazyLock;

use crate::requirements::overlay::EnvironmentOverlay;
use crate::shell::{CommandRunner, Invocation};

use super::registry::{
    interpreter_candidates, Detection, DependencySpec, Interpreter, VersionQuery,
};
use super::status::InstalledVersion;

/// `major.minor[.patch]` anywhere in a line of output.
static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("VERSION_REGEX must compile")
});

/// Parse the first `major.minor[.patch]` in `text`. A missing patch is 0.
pub fn parse_version(text: &str) -> Option<Version> {
    let caps = VERSION_REGEX.captures(text)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    let patch = caps
        .get(3)
        .map(|m| m.as_str().parse().ok())
        .unwrap_or(Some(0))?;
    Some(Version::new(major, minor, patch))
}

/// Python snippet that imports `module` and prints the installed version of
/// `distribution`.
pub fn import_snippet(module: &str, distribution: &str) -> String {
    format!(
        "import {}; from importlib.metadata import version; print(version('{}'))",
        module, distribution
    )
}

/// Scans the host for dependencies through a [`CommandRunner`].
pub struct Scanner<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Scanner<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Check a dependency's own detection against its minimum version.
    pub fn scan(&self, spec: &DependencySpec, overlay: &EnvironmentOverlay) -> Option<InstalledVersion> {
        let found = self.detect(&spec.detection, spec.min_version.as_ref(), overlay);
        match &found {
            Some(v) => tracing::debug!("{}: found {} at {}", spec.name, v, v.path.display()),
            None => tracing::debug!("{}: not found", spec.name),
        }
        found
    }

    /// Check the dependency and then each OR-group alternative.
    ///
    /// Returns the name of whatever satisfied it along with what was found.
    pub fn satisfied_by(
        &self,
        spec: &DependencySpec,
        overlay: &EnvironmentOverlay,
    ) -> Option<(String, InstalledVersion)> {
        if let Some(found) = self.scan(spec, overlay) {
            return Some((spec.name.clone(), found));
        }
        spec.alternatives.iter().find_map(|alt| {
            self.detect(&alt.detection, None, overlay).map(|found| {
                tracing::debug!("{}: satisfied by alternative {}", spec.name, alt.name);
                (alt.name.clone(), found)
            })
        })
    }

    /// The interpreter that satisfies `python`, if any.
    pub fn interpreter(
        &self,
        python: &DependencySpec,
        overlay: &EnvironmentOverlay,
    ) -> Option<Interpreter> {
        self.scan(python, overlay).map(|found| Interpreter::from_found(&found))
    }

    /// Run one detection.
    pub fn detect(
        &self,
        detection: &Detection,
        min_version: Option<&Version>,
        overlay: &EnvironmentOverlay,
    ) -> Option<InstalledVersion> {
        match detection {
            Detection::Binary { candidates } => candidates
                .iter()
                .find_map(|query| self.query(query, min_version, overlay)),
            Detection::PythonModule {
                distribution,
                module,
            } => {
                let snippet = import_snippet(module, distribution);
                interpreter_candidates().iter().find_map(|interp| {
                    // keep any leading selector args such as `py -3`
                    let mut args: Vec<String> = interp
                        .args
                        .iter()
                        .filter(|a| a.as_str() != "--version")
                        .cloned()
                        .collect();
                    args.push("-c".to_string());
                    args.push(snippet.clone());
                    let query = VersionQuery {
                        program: interp.program.clone(),
                        args,
                    };
                    self.query(&query, min_version, overlay)
                })
            }
        }
    }

    fn query(
        &self,
        query: &VersionQuery,
        min_version: Option<&Version>,
        overlay: &EnvironmentOverlay,
    ) -> Option<InstalledVersion> {
        let path = self.runner.locate(&query.program, overlay)?;
        let invocation = Invocation::new(&path.to_string_lossy(), query.args.iter().cloned());
        let result = self.runner.capture(&invocation, overlay).ok()?;
        if !result.success {
            tracing::debug!("{} exited with {:?}", invocation, result.exit_code);
            return None;
        }

        // Some tools (older Pythons) print their version on stderr.
        let raw = result
            .stdout
            .lines()
            .chain(result.stderr.lines())
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or_default()
            .to_string();
        let version = parse_version(&raw);

        if let Some(min) = min_version {
            match &version {
                Some(v) if v >= min => {}
                Some(v) => {
                    tracing::debug!("{} reports {}, below minimum {}", query.program, v, min);
                    return None;
                }
                None => {
                    tracing::debug!("{} printed no parseable version", query.program);
                    return None;
                }
            }
        }

        Some(InstalledVersion {
            program: query.program.clone(),
            path,
            launcher_args: query.launcher_args(),
            version,
            raw,
        })
    }
}
