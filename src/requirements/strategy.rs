//! Installation strategies.
//!
//! A [`Strategy`] is one way to obtain a dependency on a given host. The
//! resolver produces them in order; the executor walks that order and
//! never reorders or edits it.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::shell::Invocation;

/// Tier a strategy belongs to. Declaration order is resolution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    PrimaryPkgMgr,
    SecondaryPkgMgr,
    VendorScript,
    ManualDownload,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::PrimaryPkgMgr => "primary-pkg-mgr",
            StrategyKind::SecondaryPkgMgr => "secondary-pkg-mgr",
            StrategyKind::VendorScript => "vendor-script",
            StrategyKind::ManualDownload => "manual-download",
        })
    }
}

/// What a strategy does when attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyAction {
    /// Spawn a program directly.
    Command { invocation: Invocation },
    /// Run a script through the platform shell.
    Shell { script: String, windows: bool },
    /// Tell the user what to do. Never spawns anything.
    Advice {
        instructions: String,
        url: Option<String>,
    },
}

/// One candidate way to install a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Strategy {
    pub kind: StrategyKind,
    /// Short name shown to the user, e.g. `apt` or `deno install script`.
    pub label: String,
    pub action: StrategyAction,
    pub requires_privilege: bool,
    /// Directories (relative to home unless absolute) where this strategy
    /// puts binaries.
    pub path_additions: Vec<PathBuf>,
}

impl Strategy {
    pub fn command(
        kind: StrategyKind,
        label: impl Into<String>,
        invocation: Invocation,
        requires_privilege: bool,
    ) -> Self {
        Self {
            kind,
            label: label.into(),
            action: StrategyAction::Command { invocation },
            requires_privilege,
            path_additions: Vec::new(),
        }
    }

    pub fn shell(label: impl Into<String>, script: impl Into<String>, windows: bool) -> Self {
        Self {
            kind: StrategyKind::VendorScript,
            label: label.into(),
            action: StrategyAction::Shell {
                script: script.into(),
                windows,
            },
            requires_privilege: false,
            path_additions: Vec::new(),
        }
    }

    pub fn advice(instructions: impl Into<String>, url: Option<String>) -> Self {
        Self {
            kind: StrategyKind::ManualDownload,
            label: "manual install".to_string(),
            action: StrategyAction::Advice {
                instructions: instructions.into(),
                url,
            },
            requires_privilege: false,
            path_additions: Vec::new(),
        }
    }

    pub fn with_path_additions<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.path_additions.extend(dirs.into_iter().map(Into::into));
        self
    }

    pub fn is_advisory(&self) -> bool {
        matches!(self.action, StrategyAction::Advice { .. })
    }

    /// The command line this strategy would run, if it runs one.
    pub fn invocation(&self) -> Option<Invocation> {
        match &self.action {
            StrategyAction::Command { invocation } => Some(invocation.clone()),
            StrategyAction::Shell { script, windows } => Some(Invocation::script(script, *windows)),
            StrategyAction::Advice { .. } => None,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.label)?;
        match &self.action {
            StrategyAction::Command { invocation } => write!(f, ": {}", invocation)?,
            StrategyAction::Shell { script, .. } => write!(f, ": {}", script)?,
            StrategyAction::Advice { instructions, url } => {
                write!(f, ": {}", instructions)?;
                if let Some(url) = url {
                    write!(f, " ({})", url)?;
                }
            }
        }
        if self.requires_privilege {
            f.write_str(" (needs root)")?;
        }
        Ok(())
    }
}
