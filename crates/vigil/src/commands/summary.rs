//! Summary handler: refresh every configured domain once and report
//! counts plus connection state.

use serde::Serialize;
use tabled::Tabled;
use vigil_core::{
    AlertCounts, ConnectionState, Domain, HostCounts, JobCounts, Poller, ReportCounts, Severity,
    WebhookSource,
};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

use super::Session;

#[derive(Serialize)]
struct DomainSummary {
    domain: &'static str,
    items: usize,
    counts: serde_json::Value,
    connection: ConnectionState,
    #[serde(skip)]
    breakdown: String,
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Items")]
    items: usize,
    #[tabled(rename = "Breakdown")]
    breakdown: String,
    #[tabled(rename = "Status")]
    status: String,
}

// ── Breakdown lines ─────────────────────────────────────────────────

fn join_nonzero<'a>(parts: impl IntoIterator<Item = (&'a str, usize)>) -> String {
    let line: Vec<String> = parts
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .map(|(label, n)| format!("{label} {n}"))
        .collect();
    if line.is_empty() {
        "-".into()
    } else {
        line.join(" · ")
    }
}

fn alert_breakdown(c: &AlertCounts) -> String {
    let labels: Vec<(String, usize)> = Severity::DESCENDING
        .iter()
        .map(|s| (s.to_string(), c.for_severity(*s)))
        .collect();
    join_nonzero(labels.iter().map(|(l, n)| (l.as_str(), *n)))
}

fn host_breakdown(c: &HostCounts) -> String {
    join_nonzero([
        ("online", c.online),
        ("offline", c.offline),
        ("unknown", c.unknown),
        ("disabled", c.disabled),
        ("with problems", c.with_problems),
    ])
}

fn report_breakdown(c: &ReportCounts) -> String {
    join_nonzero(c.by_kind.iter().map(|(k, n)| (k.as_str(), *n)))
}

fn job_breakdown(c: &JobCounts) -> String {
    join_nonzero([
        ("success", c.success),
        ("warning", c.warning),
        ("failed", c.failed),
        ("running", c.running),
        ("idle", c.idle),
        ("disabled", c.disabled),
        ("unknown", c.unknown),
    ])
}

fn summarize<D: Domain>(
    poller: &Poller<D, WebhookSource>,
    breakdown: impl Fn(&D::Counts) -> String,
) -> Result<DomainSummary, CliError> {
    let counts = poller.counts();
    let json = serde_json::to_value(&*counts)
        .map_err(|e| CliError::Internal(format!("JSON serialization failed: {e}")))?;
    Ok(DomainSummary {
        domain: poller.name(),
        items: poller.snapshot().len(),
        counts: json,
        connection: poller.connection_state(),
        breakdown: breakdown(&counts),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, global: &GlobalOpts) -> Result<(), CliError> {
    let dashboard = &session.dashboard;
    dashboard.refresh_all().await;

    let mut summaries = Vec::new();
    if let Ok(p) = dashboard.alerts() {
        summaries.push(summarize(p, alert_breakdown)?);
    }
    if let Ok(p) = dashboard.hosts() {
        summaries.push(summarize(p, host_breakdown)?);
    }
    if let Ok(p) = dashboard.reports() {
        summaries.push(summarize(p, report_breakdown)?);
    }
    if let Ok(p) = dashboard.backup_jobs() {
        summaries.push(summarize(p, job_breakdown)?);
    }

    let color = output::should_color(global.color);
    let out = output::render_list(
        global.output,
        &summaries,
        |s| SummaryRow {
            domain: s.domain.into(),
            items: s.items,
            breakdown: s.breakdown.clone(),
            status: output::connection_line(&s.connection, color),
        },
        |s| s.domain.to_owned(),
    )?;
    output::print_output(&out, global.quiet);

    if !summaries.is_empty() && summaries.iter().all(|s| !s.connection.is_connected) {
        let reason = summaries
            .iter()
            .find_map(|s| s.connection.error.clone())
            .unwrap_or_else(|| "no domain could be refreshed".into());
        return Err(CliError::Unreachable { reason });
    }
    Ok(())
}
