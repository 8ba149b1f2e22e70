use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use dashboard_core::Incident;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};

/// In-memory incident list, newest first, capped at `max_incidents`.
#[derive(Clone)]
pub struct RelayState {
    incidents: Arc<Mutex<VecDeque<Value>>>,
    max_incidents: usize,
}

impl RelayState {
    pub fn new(max_incidents: usize) -> Self {
        Self {
            incidents: Arc::new(Mutex::new(VecDeque::new())),
            max_incidents: max_incidents.max(1),
        }
    }

    pub fn push(&self, incident: &Incident) {
        let mut incidents = self.incidents.lock();
        incidents.push_front(incident.to_value());
        incidents.truncate(self.max_incidents);
    }

    pub fn snapshot(&self) -> Value {
        Value::Array(self.incidents.lock().iter().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.incidents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn relay_router(state: RelayState) -> Router {
    Router::new()
        .route("/report", post(handle_report))
        .route("/data", get(handle_data))
        .with_state(state)
}

async fn handle_report(
    State(state): State<RelayState>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Some(incident) = Incident::from_value(payload) else {
        debug!("rejecting non-object report");
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"status": "error", "error": "report must be a JSON object"})),
        );
    };
    state.push(&incident);
    info!(
        source = incident.source().unwrap_or("unknown"),
        risk = %incident.risk_level(),
        "incident reported"
    );
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

async fn handle_data(State(state): State<RelayState>) -> Json<Value> {
    Json(state.snapshot())
}
