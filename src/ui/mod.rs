//! User interface components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for CI/headless environments
//! - [`MockUI`] for tests
//! - Prompts, spinners, and tables
//!
//! # Example
//!
//! ```
//! use wrkmon_setup::ui::{create_ui, OutputMode};
//!
//! // Use non-interactive mode for testability
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.show_header("wrkmon setup");
//! ui.success("All dependencies satisfied");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod table;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use prompts::confirm_on;
pub use spinner::ProgressSpinner;
pub use table::Table;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, SetupTheme};

use crate::error::Result;
use crate::requirements::{Outcome, OutcomeStatus};

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Change the output mode.
    fn set_output_mode(&mut self, mode: OutputMode);

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Ask a yes/no question.
    fn confirm(&mut self, prompt: &Prompt) -> Result<bool>;

    /// Start a spinner for an operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show a dim contextual hint.
    fn show_hint(&mut self, hint: &str);

    /// Show progress (e.g., "[2/4]").
    fn show_progress(&mut self, current: usize, total: usize);

    /// Show the final status line for one dependency.
    fn show_outcome(&mut self, outcome: &Outcome) {
        let line = format!("{}: {}", outcome.dependency, outcome.detail);
        match outcome.status {
            OutcomeStatus::AlreadySatisfied | OutcomeStatus::Installed => self.success(&line),
            OutcomeStatus::SkippedOptional => self.warning(&line),
            OutcomeStatus::Failed if outcome.required => self.error(&line),
            OutcomeStatus::Failed => self.warning(&line),
        }
    }

    /// Show the end-of-run summary.
    fn show_run_summary(&mut self, summary: &RunSummary) {
        if summary.success {
            self.success(&format!(
                "Setup complete ({} already present, {} installed)",
                summary.satisfied, summary.installed
            ));
        } else {
            self.error(&format!(
                "Setup failed: {}",
                summary.failed.join(", ")
            ));
        }
        if !summary.skipped.is_empty() {
            self.warning(&format!(
                "Optional dependencies not installed: {}",
                summary.skipped.join(", ")
            ));
        }
    }
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark as skipped.
    fn finish_skipped(&mut self, msg: &str);
}

/// A yes/no question.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Unique key for the prompt (used for lookup in tests and env overrides).
    pub key: String,
    /// The question to display.
    pub question: String,
    /// Answer used when the user just presses enter.
    pub default: bool,
}

impl Prompt {
    pub fn confirm(key: impl Into<String>, question: impl Into<String>, default: bool) -> Self {
        Self {
            key: key.into(),
            question: question.into(),
            default,
        }
    }
}

/// Counts and names shown at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub satisfied: usize,
    pub installed: usize,
    /// Required dependencies that failed.
    pub failed: Vec<String>,
    /// Optional dependencies that were skipped or failed.
    pub skipped: Vec<String>,
    /// Required dependencies never attempted because the run aborted.
    pub not_attempted: Vec<String>,
    pub success: bool,
}
