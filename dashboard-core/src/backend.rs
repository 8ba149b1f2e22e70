//! Boundary calls to the dashboard backend.
//!
//! The engine only ever talks to the backend through [`Backend`], so the
//! session can run against [`HttpBackend`] or an in-process double.

use crate::config::DashboardConfig;
use crate::error::BackendError;
use crate::incidents::Incident;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const READY_FOR_APPROVAL: &str = "ready_for_approval";
pub const SUCCESS: &str = "success";

/// Body of a `POST /fix` answer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A remediation the backend synthesized, or its refusal to make one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FixProposal {
    Ready { command: String },
    Declined { status: String, detail: Option<String> },
}

impl From<ProposalResponse> for FixProposal {
    fn from(resp: ProposalResponse) -> Self {
        let command = resp.command.filter(|c| !c.trim().is_empty());
        match (resp.status.as_str(), command) {
            (READY_FOR_APPROVAL, Some(command)) => FixProposal::Ready { command },
            (READY_FOR_APPROVAL, None) => FixProposal::Declined {
                status: resp.status,
                detail: Some("proposal carried no command".into()),
            },
            _ => FixProposal::Declined {
                status: resp.status,
                detail: resp.error,
            },
        }
    }
}

/// Body of a `POST /execute_fix` answer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS
    }
}

pub trait Backend: Send + Sync + 'static {
    /// `GET /data`. The payload is returned untouched; shape checks belong to
    /// the store.
    fn fetch_incidents(&self) -> BoxFuture<'_, Result<Value, BackendError>>;

    /// `POST /fix` with the incident record as body.
    fn propose_fix<'a>(
        &'a self,
        incident: &'a Incident,
    ) -> BoxFuture<'a, Result<FixProposal, BackendError>>;

    /// `POST /execute_fix` with `{"command": ...}`.
    fn execute_fix<'a>(
        &'a self,
        command: &'a str,
    ) -> BoxFuture<'a, Result<ExecutionResult, BackendError>>;
}

pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &DashboardConfig) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("incident-dashboard/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn read_json<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: truncate(&body, 512),
            });
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| BackendError::Decode(e.to_string()))
    }
}

impl Backend for HttpBackend {
    fn fetch_incidents(&self) -> BoxFuture<'_, Result<Value, BackendError>> {
        async move {
            let response = self.client.get(self.url("/data")).send().await?;
            Self::read_json(response).await
        }
        .boxed()
    }

    fn propose_fix<'a>(
        &'a self,
        incident: &'a Incident,
    ) -> BoxFuture<'a, Result<FixProposal, BackendError>> {
        async move {
            let response = self
                .client
                .post(self.url("/fix"))
                .json(incident)
                .send()
                .await?;
            let body: ProposalResponse = Self::read_json(response).await?;
            Ok(body.into())
        }
        .boxed()
    }

    fn execute_fix<'a>(
        &'a self,
        command: &'a str,
    ) -> BoxFuture<'a, Result<ExecutionResult, BackendError>> {
        async move {
            let response = self
                .client
                .post(self.url("/execute_fix"))
                .json(&serde_json::json!({ "command": command }))
                .send()
                .await?;
            Self::read_json(response).await
        }
        .boxed()
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
