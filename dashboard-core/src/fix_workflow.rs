//! Two-phase remediation: the backend proposes a command, an operator
//! approves it, and only then is it executed.
//!
//! ```text
//! Idle --trigger_fix--> ProposalPending --ready--> AwaitingApproval
//!   ^                        |                        |         |
//!   +------- declined -------+          reject_fix ---+   execute_fix
//!   ^                                                           |
//!   +------------------- success / failure ---------------- Executing
//! ```
//!
//! The approval modal is closed as soon as the operator approves, before the
//! execute request resolves; there is no way to take an approval back.

use crate::backend::{Backend, FixProposal};
use crate::error::FixError;
use crate::incidents::Incident;
use crate::modal::ModalGuard;
use crate::report::{execution_message, ReportKind, Reporter};
use crate::sync_loop::Refresher;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A synthesized command waiting for an operator decision.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingFix {
    pub incident: Incident,
    pub command: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum FixState {
    #[default]
    Idle,
    ProposalPending {
        incident: Incident,
    },
    AwaitingApproval(PendingFix),
    Executing {
        command: String,
    },
}

impl FixState {
    pub fn name(&self) -> &'static str {
        match self {
            FixState::Idle => "idle",
            FixState::ProposalPending { .. } => "awaiting a proposal",
            FixState::AwaitingApproval(_) => "awaiting approval",
            FixState::Executing { .. } => "executing",
        }
    }

    pub fn pending(&self) -> Option<&PendingFix> {
        match self {
            FixState::AwaitingApproval(pending) => Some(pending),
            _ => None,
        }
    }
}

/// Result of a successful execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionReport {
    pub command: String,
    pub output: Option<String>,
}

struct Inner {
    state: FixState,
    /// Bumped on every new proposal and on reset; a response whose attempt
    /// no longer matches is stale.
    attempt: u64,
}

pub struct FixWorkflow {
    backend: Arc<dyn Backend>,
    reporter: Arc<dyn Reporter>,
    modals: Arc<ModalGuard>,
    refresher: Refresher,
    refresh_delay: Duration,
    token: CancellationToken,
    inner: Mutex<Inner>,
}

impl FixWorkflow {
    pub fn new(
        backend: Arc<dyn Backend>,
        reporter: Arc<dyn Reporter>,
        modals: Arc<ModalGuard>,
        refresher: Refresher,
        refresh_delay: Duration,
        token: CancellationToken,
    ) -> Self {
        Self {
            backend,
            reporter,
            modals,
            refresher,
            refresh_delay,
            token,
            inner: Mutex::new(Inner {
                state: FixState::Idle,
                attempt: 0,
            }),
        }
    }

    pub fn state(&self) -> FixState {
        self.inner.lock().state.clone()
    }

    pub fn pending(&self) -> Option<PendingFix> {
        self.inner.lock().state.pending().cloned()
    }

    /// Asks the backend to synthesize a fix for `incident`. On success the
    /// approval modal is open and polling is suspended.
    pub async fn trigger_fix(&self, incident: &Incident) -> Result<PendingFix, FixError> {
        if incident.command().is_none() {
            self.reporter.report(
                ReportKind::InvalidInput,
                "This incident has no command attached, so there is nothing to fix.",
            );
            return Err(FixError::MissingCommand);
        }

        let attempt = {
            let mut inner = self.inner.lock();
            if inner.state != FixState::Idle {
                let busy = FixError::Busy(inner.state.name());
                drop(inner);
                self.reporter.report(ReportKind::InvalidInput, &busy.to_string());
                return Err(busy);
            }
            inner.attempt += 1;
            inner.state = FixState::ProposalPending {
                incident: incident.clone(),
            };
            inner.attempt
        };
        info!(attempt, "requesting fix proposal");

        let response = self.backend.propose_fix(incident).await;

        let mut inner = self.inner.lock();
        if inner.attempt != attempt || !matches!(inner.state, FixState::ProposalPending { .. }) {
            debug!(attempt, "ignoring proposal for an abandoned request");
            return Err(FixError::NothingPending);
        }

        let err = match response {
            Ok(FixProposal::Ready { command }) => {
                let pending = PendingFix {
                    incident: incident.clone(),
                    command,
                };
                inner.state = FixState::AwaitingApproval(pending.clone());
                self.modals.set_fix_open(true);
                info!(command = %pending.command, "fix proposal awaiting approval");
                return Ok(pending);
            }
            Ok(FixProposal::Declined { status, detail }) => FixError::Declined { status, detail },
            Err(err) => FixError::Backend(err),
        };
        inner.state = FixState::Idle;
        drop(inner);

        warn!("fix proposal failed: {err}");
        self.reporter.report(ReportKind::ProposalFailed, &err.to_string());
        Err(err)
    }

    /// Approves the pending fix and runs it. A success schedules exactly one
    /// delayed store refresh; a failure schedules none. A result that lands
    /// after `reset` is dropped without a report.
    pub async fn execute_fix(&self) -> Result<ExecutionReport, FixError> {
        let (command, attempt) = {
            let mut inner = self.inner.lock();
            let FixState::AwaitingApproval(pending) = &inner.state else {
                return Err(FixError::NothingPending);
            };
            let command = pending.command.clone();
            inner.state = FixState::Executing {
                command: command.clone(),
            };
            (command, inner.attempt)
        };
        self.modals.set_fix_open(false);
        info!(command = %command, "executing approved fix");

        let result = self.backend.execute_fix(&command).await;

        {
            let mut inner = self.inner.lock();
            if inner.attempt != attempt || !matches!(inner.state, FixState::Executing { .. }) {
                debug!(attempt, "ignoring execution result for an abandoned fix");
                return Err(FixError::NothingPending);
            }
            inner.state = FixState::Idle;
        }

        match result {
            Ok(result) if result.is_success() => {
                let message = execution_message(
                    "The fix was applied.",
                    None,
                    result.output.as_deref(),
                );
                self.reporter.report(ReportKind::ExecutionSucceeded, &message);
                self.schedule_refresh();
                Ok(ExecutionReport {
                    command,
                    output: result.output,
                })
            }
            Ok(result) => {
                let message = execution_message(
                    "The fix could not be applied.",
                    result.error.as_deref(),
                    result.output.as_deref(),
                );
                warn!(status = %result.status, "fix execution failed");
                self.reporter.report(ReportKind::ExecutionFailed, &message);
                Err(FixError::ExecutionFailed {
                    status: result.status,
                    error: result.error,
                    output: result.output,
                })
            }
            Err(err) => {
                warn!("fix execution request failed: {err}");
                let message =
                    execution_message("The fix could not be applied.", Some(&err.to_string()), None);
                self.reporter.report(ReportKind::ExecutionFailed, &message);
                Err(err.into())
            }
        }
    }

    /// Drops the pending fix without running it.
    pub fn reject_fix(&self) -> Result<PendingFix, FixError> {
        let mut inner = self.inner.lock();
        let Some(pending) = inner.state.pending().cloned() else {
            return Err(FixError::NothingPending);
        };
        inner.state = FixState::Idle;
        drop(inner);
        self.modals.set_fix_open(false);
        info!(command = %pending.command, "fix rejected by operator");
        Ok(pending)
    }

    /// Returns to `Idle` and orphans whatever request is in flight.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.attempt += 1;
        inner.state = FixState::Idle;
        drop(inner);
        self.modals.set_fix_open(false);
    }

    fn schedule_refresh(&self) {
        let refresher = self.refresher.clone();
        let delay = self.refresh_delay;
        let token = self.token.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            let outcome = refresher.refresh_if(|| !token.is_cancelled()).await;
            debug!(?outcome, "post-fix refresh finished");
        });
    }
}
