// ── Backup job domain types ──

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum JobStatus {
    Success,
    Warning,
    Failed,
    Running,
    Idle,
    Disabled,
    Unknown,
}

/// A backup job and the outcome of its latest session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupJob {
    pub id: String,
    pub name: String,
    pub job_type: String,
    pub status: JobStatus,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
    /// Session progress, 0 to 100.
    pub progress: u8,
    pub message: String,
    pub objects: u32,
    pub repository: String,
    /// Length of the last session, e.g. `"1h 12m"`.
    pub duration: String,
    pub last_run_ago: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobCounts {
    pub total: usize,
    pub success: usize,
    pub warning: usize,
    pub failed: usize,
    pub running: usize,
    pub idle: usize,
    pub disabled: usize,
    pub unknown: usize,
}

impl JobCounts {
    pub fn tally(jobs: &[Arc<BackupJob>]) -> Self {
        let mut counts = Self {
            total: jobs.len(),
            ..Self::default()
        };
        for job in jobs {
            match job.status {
                JobStatus::Success => counts.success += 1,
                JobStatus::Warning => counts.warning += 1,
                JobStatus::Failed => counts.failed += 1,
                JobStatus::Running => counts.running += 1,
                JobStatus::Idle => counts.idle += 1,
                JobStatus::Disabled => counts.disabled += 1,
                JobStatus::Unknown => counts.unknown += 1,
            }
        }
        counts
    }
}
