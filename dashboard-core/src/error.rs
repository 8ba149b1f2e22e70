use thiserror::Error;

/// Failure talking to the dashboard backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("backend answered HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unreadable response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixError {
    #[error("incident has no command to fix")]
    MissingCommand,

    #[error("a fix is already {0}")]
    Busy(&'static str),

    #[error("no fix is awaiting approval")]
    NothingPending,

    #[error("backend declined the fix (status: {status}){}", detail_suffix(.detail))]
    Declined {
        status: String,
        detail: Option<String>,
    },

    #[error("fix execution failed (status: {status}){}", detail_suffix(.error))]
    ExecutionFailed {
        status: String,
        error: Option<String>,
        output: Option<String>,
    },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) if !d.is_empty() => format!(": {d}"),
        _ => String::new(),
    }
}
