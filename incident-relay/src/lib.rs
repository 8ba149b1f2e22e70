pub mod routes;

pub use routes::{relay_router, RelayState};

/// Relay settings read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayConfig {
    pub addr: String,
    pub max_incidents: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8000".into(),
            max_incidents: 500,
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            addr: std::env::var("RELAY_ADDR").unwrap_or(defaults.addr),
            max_incidents: std::env::var("RELAY_MAX_INCIDENTS")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_incidents),
        }
    }
}

/// Binds `addr` and serves the relay until the task is dropped. Returns the
/// bound address, which matters when `addr` asks for an ephemeral port.
pub async fn spawn_relay(
    addr: &str,
    state: RelayState,
) -> std::io::Result<std::net::SocketAddr> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, relay_router(state)).await {
            tracing::error!("incident relay stopped: {err}");
        }
    });
    Ok(local)
}
