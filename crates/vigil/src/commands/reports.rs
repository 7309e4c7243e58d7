//! Report list handler.

use tabled::Tabled;
use vigil_core::{Report, Reports};

use crate::cli::{GlobalOpts, ReportsArgs};
use crate::error::CliError;
use crate::output::truncate;

use super::{ListView, Session, format_time, run_list};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Excerpt")]
    excerpt: String,
}

impl From<&Report> for ReportRow {
    fn from(r: &Report) -> Self {
        Self {
            title: truncate(&r.title, 40),
            kind: r.kind.clone(),
            status: r.status.clone(),
            created: format_time(r.created_at),
            age: r.age.clone(),
            excerpt: truncate(&r.excerpt, 60),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: ReportsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let poller = session.dashboard.reports()?;
    let kind = args.kind;
    let view = ListView::<Reports, ReportRow> {
        filter: Box::new(move |r: &Report| {
            kind.as_deref()
                .is_none_or(|k| r.kind.eq_ignore_ascii_case(k))
        }),
        to_row: |r| ReportRow::from(r.as_ref()),
        id: |r| r.id.clone(),
    };
    run_list(session, poller, &args.list, &view, global).await
}
