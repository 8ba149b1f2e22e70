use incident_relay::{relay_router, RelayConfig, RelayState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = RelayConfig::from_env();
    let state = RelayState::new(config.max_incidents);
    let listener = tokio::net::TcpListener::bind(&config.addr).await?;

    tracing::info!(addr = %config.addr, max_incidents = config.max_incidents, "incident relay listening");
    axum::serve(listener, relay_router(state)).await?;
    Ok(())
}
