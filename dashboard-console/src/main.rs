use clap::Parser;
use dashboard_core::DashboardConfig;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Terminal incident dashboard with operator-approved fixes.
#[derive(Debug, Parser)]
#[command(name = "dashboard-console", version)]
struct Cli {
    /// Backend base URL (overrides DASHBOARD_URL).
    #[arg(long)]
    url: Option<String>,

    /// Polling period in milliseconds (overrides DASHBOARD_POLL_MS).
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Delay before the post-fix refresh (overrides DASHBOARD_REFRESH_DELAY_MS).
    #[arg(long)]
    refresh_delay_ms: Option<u64>,

    /// Serve sample incidents from an in-process relay, print them and exit.
    #[arg(long)]
    demo: bool,
}

impl Cli {
    fn config(&self) -> DashboardConfig {
        let mut config = DashboardConfig::from_env();
        if let Some(url) = &self.url {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = self.poll_ms.filter(|ms| *ms > 0) {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.refresh_delay_ms {
            config.refresh_delay = Duration::from_millis(ms);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    if cli.demo {
        dashboard_console::run_demo(config).await
    } else {
        dashboard_console::run(config).await
    }
}
