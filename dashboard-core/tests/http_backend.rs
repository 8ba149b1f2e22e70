use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use dashboard_core::{
    Backend, BackendError, DashboardConfig, DashboardSession, FixProposal, FixState, HttpBackend,
    Incident, LogReporter,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct Stub {
    incidents: Arc<Mutex<Value>>,
    data_status: Arc<Mutex<Option<StatusCode>>>,
    fix_bodies: Arc<Mutex<Vec<Value>>>,
    executed: Arc<Mutex<Vec<String>>>,
}

async fn data(State(stub): State<Stub>) -> (StatusCode, Json<Value>) {
    if let Some(status) = *stub.data_status.lock().expect("lock") {
        return (status, Json(json!({"detail": "unavailable"})));
    }
    (StatusCode::OK, Json(stub.incidents.lock().expect("lock").clone()))
}

async fn fix(State(stub): State<Stub>, Json(body): Json<Value>) -> Json<Value> {
    stub.fix_bodies.lock().expect("lock").push(body.clone());
    let cmd = body
        .pointer("/raw_data/cmd")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if cmd == "unknown" {
        return Json(json!({"status": "error", "error": "no remediation for unknown"}));
    }
    Json(json!({"status": "ready_for_approval", "command": format!("systemctl restart {cmd}")}))
}

async fn execute_fix(State(stub): State<Stub>, Json(body): Json<Value>) -> Json<Value> {
    let command = body
        .get("command")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    stub.executed.lock().expect("lock").push(command);
    Json(json!({"status": "success", "output": "ok"}))
}

async fn serve(stub: Stub) -> String {
    let app = Router::new()
        .route("/data", get(data))
        .route("/fix", post(fix))
        .route("/execute_fix", post(execute_fix))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

fn config(base_url: String) -> DashboardConfig {
    DashboardConfig {
        base_url,
        poll_interval: Duration::from_millis(100),
        refresh_delay: Duration::from_millis(50),
        ..DashboardConfig::default()
    }
}

fn sample_incident() -> Value {
    json!({
        "what": "'nginx' exited",
        "risk_score": 92,
        "raw_data": {"cmd": "nginx", "pid": 311, "exit_code": 1, "source": "AI"}
    })
}

#[tokio::test]
async fn fetches_and_reports_http_status() {
    let stub = Stub::default();
    *stub.incidents.lock().expect("lock") = json!([sample_incident()]);
    let backend = HttpBackend::new(&config(serve(stub.clone()).await)).expect("client");

    let payload = backend.fetch_incidents().await.expect("data");
    assert_eq!(payload, json!([sample_incident()]));

    *stub.data_status.lock().expect("lock") = Some(StatusCode::SERVICE_UNAVAILABLE);
    let err = backend.fetch_incidents().await.unwrap_err();
    assert!(matches!(err, BackendError::Status { status: 503, .. }));
}

#[tokio::test]
async fn unreachable_backend_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let backend = HttpBackend::new(&config(format!("http://{addr}"))).expect("client");
    let err = backend.fetch_incidents().await.unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
}

#[tokio::test]
async fn proposal_posts_the_incident_verbatim() {
    let stub = Stub::default();
    let backend = HttpBackend::new(&config(serve(stub.clone()).await)).expect("client");
    let incident = Incident::from_value(sample_incident()).expect("object");

    let proposal = backend.propose_fix(&incident).await.expect("proposal");
    assert_eq!(
        proposal,
        FixProposal::Ready {
            command: "systemctl restart nginx".into()
        }
    );
    assert_eq!(stub.fix_bodies.lock().expect("lock").as_slice(), &[sample_incident()]);

    let unknown = Incident::from_value(json!({"raw_data": {"cmd": "unknown"}})).expect("object");
    assert!(matches!(
        backend.propose_fix(&unknown).await.expect("proposal"),
        FixProposal::Declined { .. }
    ));
}

#[tokio::test]
async fn session_syncs_and_runs_an_approved_fix() {
    let stub = Stub::default();
    *stub.incidents.lock().expect("lock") = json!([sample_incident()]);
    let session = DashboardSession::mount_http(
        config(serve(stub.clone()).await),
        Arc::new(LogReporter),
    )
    .expect("session");

    let mut updates = session.store().subscribe();
    tokio::time::timeout(Duration::from_secs(5), updates.changed())
        .await
        .expect("first sync in time")
        .expect("store alive");
    assert_eq!(session.metrics().ai_ratio, 100);

    let target = session.current().snapshot.get(0).cloned().expect("incident");
    let pending = session.fix().trigger_fix(&target).await.expect("proposal");
    assert_eq!(pending.command, "systemctl restart nginx");
    assert!(session.polling_suspended());

    let report = session.fix().execute_fix().await.expect("executed");
    assert_eq!(report.output.as_deref(), Some("ok"));
    assert_eq!(session.fix().state(), FixState::Idle);
    assert_eq!(
        stub.executed.lock().expect("lock").as_slice(),
        &["systemctl restart nginx".to_string()]
    );

    session.unmount().await;
}
