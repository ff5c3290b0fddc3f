//! Mock command runner for testing.
//!
//! `MockRunner` implements [`CommandRunner`] against an in-memory set of
//! "installed" programs and canned install behaviours, and records every
//! invocation for later assertion. Nothing is ever spawned.
//!
//! # Example
//!
//! ```
//! use wrkmon_setup::shell::{CommandRunner, Invocation, MockRunner};
//! use wrkmon_setup::requirements::overlay::EnvironmentOverlay;
//!
//! let runner = MockRunner::new()
//!     .with_tool("mpv", "mpv 0.38.0 Copyright © 2000-2024 mpv/MPlayer/mplayer2 projects")
//!     .on_run_installing("brew install deno", "deno", "deno 2.1.4 (stable, release)");
//!
//! let overlay = EnvironmentOverlay::default();
//! assert!(runner.locate("mpv", &overlay).is_some());
//! assert!(runner.locate("deno", &overlay).is_none());
//!
//! runner.run(&Invocation::new("brew", ["install", "deno"]), &overlay).unwrap();
//! assert!(runner.locate("deno", &overlay).is_some());
//! assert_eq!(runner.runs().len(), 1);
//! ```

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, SetupError};
use crate::requirements::overlay::EnvironmentOverlay;

use super::command::{CommandResult, Invocation};
use super::runner::CommandRunner;

/// Directory mock programs appear to live in.
const MOCK_BIN: &str = "/mock/bin";

#[derive(Debug, Clone)]
struct Response {
    program: String,
    arg_contains: String,
    stdout: String,
}

#[derive(Debug, Clone)]
struct InstallRule {
    pattern: String,
    exit_code: i32,
    adds_tool: Option<String>,
    response: Option<Response>,
}

/// Mock runner implementation for testing.
#[derive(Debug, Default)]
pub struct MockRunner {
    tools: RefCell<HashSet<String>>,
    responses: RefCell<Vec<Response>>,
    rules: Vec<InstallRule>,
    captured: RefCell<Vec<Invocation>>,
    ran: RefCell<Vec<Invocation>>,
}

fn base_name(program: &str) -> String {
    Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string())
}

impl MockRunner {
    /// Create a runner where nothing is installed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `program` as present; `--version` queries print `version_output`.
    pub fn with_tool(self, program: &str, version_output: &str) -> Self {
        self.add_tool(program);
        self.add_response(program, "--version", version_output);
        self
    }

    /// Mark `program` as present; queries with an argument containing `arg`
    /// print `output`.
    pub fn with_output(self, program: &str, arg: &str, output: &str) -> Self {
        self.add_tool(program);
        self.add_response(program, arg, output);
        self
    }

    /// Make `interpreter -c "import <module> ..."` print `output`.
    pub fn with_module(self, interpreter: &str, module: &str, output: &str) -> Self {
        self.add_response(interpreter, &format!("import {}", module), output);
        self
    }

    /// Any run whose command line contains `pattern` exits with `exit_code`.
    pub fn on_run(mut self, pattern: &str, exit_code: i32) -> Self {
        self.rules.push(InstallRule {
            pattern: pattern.to_string(),
            exit_code,
            adds_tool: None,
            response: None,
        });
        self
    }

    /// A run matching `pattern` succeeds and makes `program` available.
    pub fn on_run_installing(mut self, pattern: &str, program: &str, version_output: &str) -> Self {
        self.rules.push(InstallRule {
            pattern: pattern.to_string(),
            exit_code: 0,
            adds_tool: Some(program.to_string()),
            response: Some(Response {
                program: program.to_string(),
                arg_contains: "--version".to_string(),
                stdout: version_output.to_string(),
            }),
        });
        self
    }

    /// A run matching `pattern` succeeds and makes `module` importable.
    pub fn on_run_installing_module(
        mut self,
        pattern: &str,
        interpreter: &str,
        module: &str,
        output: &str,
    ) -> Self {
        self.rules.push(InstallRule {
            pattern: pattern.to_string(),
            exit_code: 0,
            adds_tool: None,
            response: Some(Response {
                program: interpreter.to_string(),
                arg_contains: format!("import {}", module),
                stdout: output.to_string(),
            }),
        });
        self
    }

    fn add_tool(&self, program: &str) {
        self.tools.borrow_mut().insert(program.to_string());
    }

    fn add_response(&self, program: &str, arg_contains: &str, stdout: &str) {
        self.responses.borrow_mut().push(Response {
            program: program.to_string(),
            arg_contains: arg_contains.to_string(),
            stdout: stdout.to_string(),
        });
    }

    /// Install commands run so far.
    pub fn runs(&self) -> Vec<Invocation> {
        self.ran.borrow().clone()
    }

    /// Query commands run so far.
    pub fn captures(&self) -> Vec<Invocation> {
        self.captured.borrow().clone()
    }

    /// Check whether any install command line contained `pattern`.
    pub fn has_run(&self, pattern: &str) -> bool {
        self.ran
            .borrow()
            .iter()
            .any(|inv| inv.to_string().contains(pattern))
    }
}

impl CommandRunner for MockRunner {
    fn locate(&self, program: &str, _overlay: &EnvironmentOverlay) -> Option<PathBuf> {
        let name = base_name(program);
        self.tools
            .borrow()
            .contains(&name)
            .then(|| PathBuf::from(MOCK_BIN).join(name))
    }

    fn capture(
        &self,
        invocation: &Invocation,
        overlay: &EnvironmentOverlay,
    ) -> Result<CommandResult> {
        self.captured.borrow_mut().push(invocation.clone());

        let name = base_name(&invocation.program);
        if self.locate(&name, overlay).is_none() {
            return Err(SetupError::ExternalToolFailure {
                command: invocation.to_string(),
                code: None,
            });
        }

        let responses = self.responses.borrow();
        let matched = responses.iter().rev().find(|r| {
            r.program == name && invocation.args.iter().any(|a| a.contains(&r.arg_contains))
        });

        Ok(match matched {
            Some(r) => CommandResult::success(r.stdout.clone(), String::new(), Duration::ZERO),
            None => CommandResult::failure(
                Some(1),
                String::new(),
                format!("{}: no mock response", name),
                Duration::ZERO,
            ),
        })
    }

    fn run(&self, invocation: &Invocation, _overlay: &EnvironmentOverlay) -> Result<CommandResult> {
        self.ran.borrow_mut().push(invocation.clone());

        let line = invocation.to_string();
        let Some(rule) = self.rules.iter().find(|r| line.contains(&r.pattern)) else {
            return Err(SetupError::ExternalToolFailure {
                command: line,
                code: None,
            });
        };

        if rule.exit_code != 0 {
            return Ok(CommandResult::failure(
                Some(rule.exit_code),
                String::new(),
                String::new(),
                Duration::ZERO,
            ));
        }

        if let Some(tool) = &rule.adds_tool {
            self.add_tool(tool);
        }
        if let Some(response) = &rule.response {
            self.responses.borrow_mut().push(response.clone());
        }

        Ok(CommandResult::success(
            String::new(),
            String::new(),
            Duration::ZERO,
        ))
    }
}
