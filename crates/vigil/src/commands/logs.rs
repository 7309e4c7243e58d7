//! System log handler: one fetch of both identity-provider event feeds.

use std::sync::Arc;

use tabled::Tabled;
use vigil_core::{ListQuery, SystemLogEntry};

use crate::cli::{GlobalOpts, LogsArgs, OutputFormat};
use crate::error::CliError;
use crate::output::{self, truncate};

use super::Session;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Event")]
    event: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Details")]
    details: String,
}

impl From<&SystemLogEntry> for LogRow {
    fn from(e: &SystemLogEntry) -> Self {
        Self {
            time: e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            source: e.source.to_string(),
            severity: e.severity.to_string(),
            event: e.event.clone(),
            user: e.user.clone(),
            ip: e.ip_address.clone(),
            details: truncate(&e.details, 60),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: LogsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let entries: Vec<Arc<SystemLogEntry>> = session
        .dashboard
        .system_logs()
        .await
        .map_err(|e| session.fail(e))?
        .into_iter()
        .map(Arc::new)
        .collect();

    let query = ListQuery {
        search: args.search,
        page: args.page,
        page_size: args.page_size,
    };
    let page = query.apply(&entries, |e: &SystemLogEntry| {
        args.severity.is_none_or(|min| e.severity >= min)
    });

    let body = output::render_list(
        global.output,
        &page.items,
        |e| LogRow::from(e.as_ref()),
        |e| e.id.clone(),
    )?;
    let out = if global.output == OutputFormat::Table {
        format!("{body}\n{}", output::page_footer(&page))
    } else {
        body
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
