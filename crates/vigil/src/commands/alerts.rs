//! Alert list handler.

use tabled::Tabled;
use vigil_core::{Alert, AlertFilter, Alerts};

use crate::cli::{AlertsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output::truncate;

use super::{ListView, Session, run_list};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Problem")]
    problem: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Seen")]
    occurrences: u32,
}

impl From<&Alert> for AlertRow {
    fn from(a: &Alert) -> Self {
        Self {
            severity: a.severity.to_string(),
            status: a.status.to_string(),
            host: a.host.clone(),
            problem: truncate(&a.problem, 60),
            category: a.category.to_string(),
            duration: a.duration.clone(),
            occurrences: a.occurrences,
        }
    }
}

fn filter_for(args: &AlertsArgs) -> Vec<AlertFilter> {
    let mut filters = Vec::new();
    if let Some(min) = args.severity {
        filters.push(AlertFilter::MinSeverity(min));
    }
    if let Some(status) = args.status {
        filters.push(AlertFilter::Status(status));
    }
    if args.open {
        filters.push(AlertFilter::Open);
    }
    filters
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: AlertsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let poller = session.dashboard.alerts()?;
    let filters = filter_for(&args);
    let view = ListView::<Alerts, AlertRow> {
        filter: Box::new(move |a: &Alert| filters.iter().all(|f| f.matches(a))),
        to_row: |a| AlertRow::from(a.as_ref()),
        id: |a| a.id.clone(),
    };
    run_list(session, poller, &args.list, &view, global).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ListArgs;
    use vigil_core::{AlertStatus, Severity};

    fn args() -> AlertsArgs {
        AlertsArgs {
            list: ListArgs {
                search: None,
                page: 1,
                page_size: 0,
                watch: false,
            },
            severity: None,
            status: None,
            open: false,
        }
    }

    #[test]
    fn no_flags_means_no_filters() {
        assert!(filter_for(&args()).is_empty());
    }

    #[test]
    fn flags_combine() {
        let a = AlertsArgs {
            severity: Some(Severity::High),
            status: Some(AlertStatus::Active),
            ..args()
        };
        assert_eq!(
            filter_for(&a),
            vec![
                AlertFilter::MinSeverity(Severity::High),
                AlertFilter::Status(AlertStatus::Active),
            ]
        );
    }
}
