//! Run reports.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::environment::HostProfile;
use crate::error::{Result, SetupError};
use crate::requirements::{Outcome, OutcomeStatus};
use crate::ui::RunSummary;

/// Everything a run produced, in dependency order.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// The host the run was planned against.
    pub host: HostProfile,
    /// One outcome per dependency that was reached.
    pub outcomes: Vec<Outcome>,
    /// Dependencies never reached because a required one failed.
    pub not_attempted: Vec<String>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

impl Report {
    pub fn new(host: HostProfile) -> Self {
        Self {
            host,
            outcomes: Vec::new(),
            not_attempted: Vec::new(),
            finished_at: Utc::now(),
        }
    }

    /// Whether every required dependency is usable.
    pub fn success(&self) -> bool {
        self.not_attempted.is_empty() && !self.outcomes.iter().any(Outcome::is_fatal)
    }

    /// Process exit code: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.success() {
            0
        } else {
            1
        }
    }

    /// Look up the outcome for a dependency.
    pub fn outcome(&self, dependency: &str) -> Option<&Outcome> {
        self.outcomes.iter().find(|o| o.dependency == dependency)
    }

    /// Counts and names for the end-of-run summary.
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            not_attempted: self.not_attempted.clone(),
            success: self.success(),
            ..Default::default()
        };

        for outcome in &self.outcomes {
            match outcome.status {
                OutcomeStatus::AlreadySatisfied => summary.satisfied += 1,
                OutcomeStatus::Installed => summary.installed += 1,
                OutcomeStatus::Failed if outcome.required => {
                    summary.failed.push(outcome.dependency.clone())
                }
                OutcomeStatus::Failed | OutcomeStatus::SkippedOptional => {
                    summary.skipped.push(outcome.dependency.clone())
                }
            }
        }

        summary
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SetupError::Other(e.into()))
    }
}
