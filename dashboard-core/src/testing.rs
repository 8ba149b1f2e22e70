//! In-process doubles shared by the unit tests.

use crate::backend::{Backend, ExecutionResult, FixProposal};
use crate::error::BackendError;
use crate::incidents::Incident;
use crate::report::{ReportKind, Reporter};
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub(crate) struct MockBackend {
    pub data: Mutex<Result<Value, BackendError>>,
    pub proposal: Mutex<Result<FixProposal, BackendError>>,
    pub execution: Mutex<Result<ExecutionResult, BackendError>>,
    pub fetch_delay: Mutex<Option<Duration>>,
    pub propose_delay: Mutex<Option<Duration>>,
    pub execute_delay: Mutex<Option<Duration>>,
    pub fetch_calls: AtomicUsize,
    pub proposed: Mutex<Vec<Incident>>,
    pub executed: Mutex<Vec<String>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            data: Mutex::new(Ok(Value::Array(Vec::new()))),
            proposal: Mutex::new(Ok(FixProposal::Declined {
                status: "unset".into(),
                detail: None,
            })),
            execution: Mutex::new(Ok(ExecutionResult::default())),
            fetch_delay: Mutex::new(None),
            propose_delay: Mutex::new(None),
            execute_delay: Mutex::new(None),
            fetch_calls: AtomicUsize::new(0),
            proposed: Mutex::new(Vec::new()),
            executed: Mutex::new(Vec::new()),
        }
    }
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn proposals(&self) -> usize {
        self.proposed.lock().len()
    }

    pub fn executions(&self) -> usize {
        self.executed.lock().len()
    }
}

impl Backend for MockBackend {
    fn fetch_incidents(&self) -> BoxFuture<'_, Result<Value, BackendError>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.fetch_delay.lock();
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.data.lock().clone()
        }
        .boxed()
    }

    fn propose_fix<'a>(
        &'a self,
        incident: &'a Incident,
    ) -> BoxFuture<'a, Result<FixProposal, BackendError>> {
        self.proposed.lock().push(incident.clone());
        let delay = *self.propose_delay.lock();
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.proposal.lock().clone()
        }
        .boxed()
    }

    fn execute_fix<'a>(
        &'a self,
        command: &'a str,
    ) -> BoxFuture<'a, Result<ExecutionResult, BackendError>> {
        self.executed.lock().push(command.to_string());
        let delay = *self.execute_delay.lock();
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.execution.lock().clone()
        }
        .boxed()
    }
}

#[derive(Clone, Default)]
pub(crate) struct CaptureReporter {
    pub seen: Arc<Mutex<Vec<(ReportKind, String)>>>,
}

impl CaptureReporter {
    pub fn kinds(&self) -> Vec<ReportKind> {
        self.seen.lock().iter().map(|(kind, _)| *kind).collect()
    }

    pub fn last(&self) -> Option<(ReportKind, String)> {
        self.seen.lock().last().cloned()
    }
}

impl Reporter for CaptureReporter {
    fn report(&self, kind: ReportKind, message: &str) {
        self.seen.lock().push((kind, message.to_string()));
    }
}
