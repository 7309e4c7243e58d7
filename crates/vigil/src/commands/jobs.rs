//! Backup job list handler.

use tabled::Tabled;
use vigil_core::{BackupJob, BackupJobs, JobFilter};

use crate::cli::{GlobalOpts, JobsArgs};
use crate::error::CliError;
use crate::output::truncate;

use super::{ListView, Session, format_time, run_list};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct JobRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    job_type: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Progress")]
    progress: String,
    #[tabled(rename = "Last run")]
    last_run: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Next run")]
    next_run: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&BackupJob> for JobRow {
    fn from(j: &BackupJob) -> Self {
        Self {
            name: j.name.clone(),
            job_type: j.job_type.clone(),
            status: j.status.to_string(),
            progress: format!("{}%", j.progress),
            last_run: format_time(j.last_run),
            duration: j.duration.clone(),
            next_run: format_time(j.next_run),
            message: truncate(&j.message, 40),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(session: &Session, args: JobsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let poller = session.dashboard.backup_jobs()?;
    let filter = args.status.map_or(JobFilter::All, JobFilter::Status);
    let view = ListView::<BackupJobs, JobRow> {
        filter: Box::new(move |j: &BackupJob| filter.matches(j)),
        to_row: |j| JobRow::from(j.as_ref()),
        id: |j| j.id.clone(),
    };
    run_list(session, poller, &args.list, &view, global).await
}
