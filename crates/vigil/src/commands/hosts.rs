//! Host list handler.

use tabled::Tabled;
use vigil_core::{Host, HostFilter, Hosts};

use crate::cli::{GlobalOpts, HostsArgs};
use crate::error::CliError;

use super::{ListView, Session, format_time, run_list};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "Mem")]
    memory: String,
    #[tabled(rename = "Disk")]
    disk: String,
    #[tabled(rename = "Problems")]
    problems: u32,
    #[tabled(rename = "Last seen")]
    last_seen: String,
}

impl From<&Host> for HostRow {
    fn from(h: &Host) -> Self {
        Self {
            name: h.name.clone(),
            ip: h.ip.clone(),
            status: h.status.to_string(),
            cpu: format!("{:.0}%", h.cpu_usage),
            memory: format!("{:.0}%", h.memory_usage),
            disk: format!("{:.0}%", h.disk_usage),
            problems: h.problem_count,
            last_seen: format_time(h.last_seen),
        }
    }
}

fn filter_for(args: &HostsArgs) -> HostFilter {
    match (args.status, args.problems) {
        (Some(status), _) => HostFilter::Status(status),
        (None, true) => HostFilter::WithProblems,
        (None, false) => HostFilter::All,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: HostsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let poller = session.dashboard.hosts()?;
    let filter = filter_for(&args);
    let view = ListView::<Hosts, HostRow> {
        filter: Box::new(move |h: &Host| filter.matches(h)),
        to_row: |h| HostRow::from(h.as_ref()),
        id: |h| h.id.clone(),
    };
    run_list(session, poller, &args.list, &view, global).await
}
