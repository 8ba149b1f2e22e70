use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// What an operator-facing notification is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    InvalidInput,
    ProposalFailed,
    ExecutionSucceeded,
    ExecutionFailed,
}

impl ReportKind {
    pub fn is_error(&self) -> bool {
        !matches!(self, ReportKind::ExecutionSucceeded)
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::InvalidInput => "Invalid input",
            ReportKind::ProposalFailed => "Fix proposal failed",
            ReportKind::ExecutionSucceeded => "Fix executed",
            ReportKind::ExecutionFailed => "Fix execution failed",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Surface that shows workflow results to the operator.
pub trait Reporter: Send + Sync + 'static {
    fn report(&self, kind: ReportKind, message: &str);
}

/// Sends reports to the log only.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, kind: ReportKind, message: &str) {
        if kind.is_error() {
            warn!(kind = ?kind, "{message}");
        } else {
            info!(kind = ?kind, "{message}");
        }
    }
}

/// Message body for an execution outcome: the error line (if any) followed
/// by the command output.
pub fn execution_message(headline: &str, error: Option<&str>, output: Option<&str>) -> String {
    let mut message = headline.to_string();
    if let Some(error) = error.filter(|e| !e.is_empty()) {
        message.push_str(&format!("\n\nError: {error}"));
    }
    if let Some(output) = output.filter(|o| !o.is_empty()) {
        message.push_str(&format!("\n\nOutput:\n{output}"));
    }
    message
}
