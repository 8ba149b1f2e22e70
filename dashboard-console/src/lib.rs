pub mod commands;
pub mod render;

use crate::commands::{parse_command, Command, HELP};
use crate::render::{render_table, ConsoleReporter};
use dashboard_core::{DashboardConfig, DashboardSession, FixState, Incident};
use incident_relay::{spawn_relay, RelayState};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;

/// Runs the interactive dashboard until `quit` or end of input.
pub async fn run(config: DashboardConfig) -> anyhow::Result<()> {
    let session = Arc::new(DashboardSession::mount_http(config, Arc::new(ConsoleReporter))?);
    println!("{HELP}\n");

    let redraw = tokio::spawn(redraw_on_change(session.clone()));
    let mut operations = JoinSet::new();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => dispatch(&session, &mut operations, command),
            Err(err) => println!("{err}"),
        }
    }

    redraw.abort();
    if !operations.is_empty() {
        tracing::info!(outstanding = operations.len(), "abandoning fix requests still in flight");
    }
    operations.shutdown().await;
    session.unmount().await;
    Ok(())
}

/// Starts an in-process relay seeded with sample incidents, syncs once,
/// prints the table and exits.
pub async fn run_demo(mut config: DashboardConfig) -> anyhow::Result<()> {
    let relay = RelayState::new(100);
    for report in demo_reports() {
        if let Some(incident) = Incident::from_value(report) {
            relay.push(&incident);
        }
    }
    let addr = spawn_relay("127.0.0.1:0", relay).await?;
    config.base_url = format!("http://{addr}");

    let session = DashboardSession::mount_http(config, Arc::new(ConsoleReporter))?;
    let mut updates = session.store().subscribe();
    tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|state| state.last_update.is_some()),
    )
    .await??;

    redraw(&session);
    session.detail().open(session.current().snapshot.get(0).cloned());
    if let Some(json) = session.detail().detail_json() {
        println!("\nANALYSIS #1:\n{json}");
    }
    session.unmount().await;
    Ok(())
}

fn dispatch(session: &Arc<DashboardSession>, operations: &mut JoinSet<()>, command: Command) {
    while operations.try_join_next().is_some() {}

    match command {
        Command::List => redraw(session),
        Command::Show(n) => {
            let Some(incident) = incident_at(session, n) else {
                return;
            };
            session.detail().open(Some(incident));
            if let Some(json) = session.detail().detail_json() {
                println!("ANALYSIS #{n}:\n{json}\n(refresh paused; 'close' to resume)");
            }
        }
        Command::Close => {
            session.detail().close();
            redraw(session);
        }
        Command::Fix(n) => {
            let Some(incident) = incident_at(session, n) else {
                return;
            };
            let session = session.clone();
            operations.spawn(async move {
                if let Ok(pending) = session.fix().trigger_fix(&incident).await {
                    println!(
                        "Proposed fix for #{n}:\n    {}\nType 'approve' to run it or 'reject' to discard it.",
                        pending.command
                    );
                }
            });
        }
        Command::Approve => {
            if !matches!(session.fix().state(), FixState::AwaitingApproval(_)) {
                println!("No fix is waiting for approval.");
                return;
            }
            let session = session.clone();
            operations.spawn(async move {
                let _ = session.fix().execute_fix().await;
            });
        }
        Command::Reject => match session.fix().reject_fix() {
            Ok(pending) => println!("Discarded: {}", pending.command),
            Err(err) => println!("{err}"),
        },
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

fn incident_at(session: &DashboardSession, n: usize) -> Option<Incident> {
    let incident = session.current().snapshot.get(n - 1).cloned();
    if incident.is_none() {
        println!("There is no incident #{n}.");
    }
    incident
}

fn redraw(session: &DashboardSession) {
    print!("{}", render_table(&session.current(), &session.metrics()));
}

async fn redraw_on_change(session: Arc<DashboardSession>) {
    let mut updates = session.store().subscribe();
    while updates.changed().await.is_ok() {
        if !session.polling_suspended() {
            redraw(&session);
        }
    }
}

fn demo_reports() -> Vec<serde_json::Value> {
    vec![
        serde_json::json!({
            "who": "PID: 2231 (UID: 1000)",
            "what": "'backup.sh' process failed.",
            "where": "Kernel Space",
            "when": "2026-10-18 09:02:10",
            "why": "Permission denied writing to target directory.",
            "severity": "low",
            "risk_score": 30,
            "category": "system",
            "suggested_action": "Check directory ownership.",
            "raw_data": {"cmd": "backup.sh", "pid": 2231, "exit_code": 13, "source": "Local Dictionary"}
        }),
        serde_json::json!({
            "who": "PID: 1830 (UID: 0)",
            "what": "'nginx' process failed.",
            "where": "Kernel Space",
            "when": "2026-10-18 09:10:31",
            "why": "Port 80 already in use.",
            "severity": "medium",
            "risk_score": 55,
            "category": "service",
            "suggested_action": "Restart the service after freeing the port.",
            "raw_data": {"cmd": "nginx", "pid": 1830, "exit_code": 1, "source": "AI"}
        }),
        serde_json::json!({
            "who": "PID: 4242 (UID: 0)",
            "what": "'sshd' process failed.",
            "where": "Kernel Space",
            "when": "2026-10-18 09:12:44",
            "why": "Repeated authentication failures from a single address.",
            "severity": "critical",
            "risk_score": 95,
            "category": "security",
            "mitre_technique": "T1110",
            "suggested_action": "Block the source address.",
            "raw_data": {"cmd": "sshd", "pid": 4242, "exit_code": 255, "source": "Rules (ssh_bruteforce)"}
        }),
    ]
}
