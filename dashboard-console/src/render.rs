use dashboard_core::{DerivedMetrics, Incident, ReportKind, Reporter, RiskLevel, StoreState};
use std::fmt::Write as _;

pub fn render_table(state: &StoreState, metrics: &DerivedMetrics) -> String {
    let mut out = String::new();
    let levels = RiskLevel::ALL
        .iter()
        .map(|level| format!("{level} {}", metrics.count(*level)))
        .collect::<Vec<_>>()
        .join(" / ");
    let _ = writeln!(
        out,
        "Incidents: {}  |  last update {}  |  AI ratio {}%  |  {}",
        metrics.total,
        state.last_update_label(),
        metrics.ai_ratio,
        levels
    );

    if state.snapshot.is_empty() {
        out.push_str("  (no incidents)\n");
        return out;
    }

    let _ = writeln!(
        out,
        "{:>3}  {:<19}  {:<8}  {:>5}  {:<20}  {:<14}  {}",
        "#", "WHEN", "RISK", "SCORE", "SOURCE", "COMMAND", "WHAT"
    );
    for (index, incident) in state.snapshot.iter().enumerate() {
        let _ = writeln!(out, "{}", render_row(index + 1, incident));
    }
    out
}

fn render_row(number: usize, incident: &Incident) -> String {
    let score = incident
        .risk_score()
        .map(|s| format!("{s:.0}"))
        .unwrap_or_else(|| "-".into());
    format!(
        "{:>3}  {:<19}  {:<8}  {:>5}  {:<20}  {:<14}  {}",
        number,
        clip(incident.text("when").unwrap_or("-"), 19),
        incident.risk_level().as_str(),
        score,
        clip(incident.source().unwrap_or("-"), 20),
        clip(incident.command().unwrap_or("-"), 14),
        clip(incident.text("what").unwrap_or("-"), 60),
    )
}

fn clip(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(width.saturating_sub(1)).collect();
    clipped.push('~');
    clipped
}

/// Prints workflow results in place of blocking alert dialogs.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, kind: ReportKind, message: &str) {
        let marker = if kind.is_error() { "!!" } else { "ok" };
        println!("[{marker}] {}: {message}", kind.title());
    }
}
