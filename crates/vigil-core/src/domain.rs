// ── Domain descriptors ──
//
// Ties each dashboard domain's raw shape, normalizer, ordering, and
// aggregate counts together so the poller can stay generic.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use vigil_api::RawRecord;
use vigil_api::models::{RawAlert, RawBackupJob, RawHost, RawReport};

use crate::error::ShapeError;
use crate::model::{
    Alert, AlertCounts, BackupJob, Host, HostCounts, JobCounts, Keyed, Report, ReportCounts,
};
use crate::normalize;
use crate::sort;
use crate::store::OrderMode;

/// One dashboard domain.
pub trait Domain: Send + Sync + 'static {
    type Raw: RawRecord;
    type Record: Keyed + PartialEq + Clone + fmt::Debug + Serialize + Send + Sync + 'static;
    type Counts: Default + Clone + fmt::Debug + Serialize + Send + Sync + 'static;

    /// Short name used in logs and errors.
    const NAME: &'static str;
    const ORDER: OrderMode = OrderMode::Sorted;

    fn normalize(raw: &Self::Raw, now: DateTime<Utc>) -> Result<Self::Record, ShapeError>;
    fn sort(records: Vec<Self::Record>) -> Vec<Self::Record>;
    fn counts(records: &[Arc<Self::Record>]) -> Self::Counts;
}

/// Normalize and sort one raw payload. Records that fail normalization
/// are dropped; the rest of the batch proceeds.
pub fn normalize_batch<D: Domain>(values: Vec<Value>, now: DateTime<Utc>) -> Vec<D::Record> {
    let total = values.len();
    let records: Vec<D::Record> = values
        .into_iter()
        .filter_map(|value| {
            let normalized = D::Raw::from_value(value)
                .ok_or(ShapeError::NotAnObject { domain: D::NAME })
                .and_then(|raw| D::normalize(&raw, now));
            normalized
                .inspect_err(|e| debug!(domain = D::NAME, error = %e, "dropping record"))
                .ok()
        })
        .collect();
    if records.len() < total {
        debug!(
            domain = D::NAME,
            kept = records.len(),
            dropped = total - records.len(),
            "normalized batch"
        );
    }
    D::sort(records)
}

// ── Domains ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct Alerts;

impl Domain for Alerts {
    type Raw = RawAlert;
    type Record = Alert;
    type Counts = AlertCounts;
    const NAME: &'static str = "alerts";

    fn normalize(raw: &RawAlert, now: DateTime<Utc>) -> Result<Alert, ShapeError> {
        normalize::normalize_alert(raw, now)
    }
    fn sort(records: Vec<Alert>) -> Vec<Alert> {
        sort::newest_first(records)
    }
    fn counts(records: &[Arc<Alert>]) -> AlertCounts {
        AlertCounts::tally(records)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Hosts;

impl Domain for Hosts {
    type Raw = RawHost;
    type Record = Host;
    type Counts = HostCounts;
    const NAME: &'static str = "hosts";

    fn normalize(raw: &RawHost, now: DateTime<Utc>) -> Result<Host, ShapeError> {
        normalize::normalize_host(raw, now)
    }
    fn sort(records: Vec<Host>) -> Vec<Host> {
        sort::by_name(records)
    }
    fn counts(records: &[Arc<Host>]) -> HostCounts {
        HostCounts::tally(records)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Reports;

impl Domain for Reports {
    type Raw = RawReport;
    type Record = Report;
    type Counts = ReportCounts;
    const NAME: &'static str = "reports";

    fn normalize(raw: &RawReport, now: DateTime<Utc>) -> Result<Report, ShapeError> {
        normalize::normalize_report(raw, now)
    }
    fn sort(records: Vec<Report>) -> Vec<Report> {
        sort::newest_first(records)
    }
    fn counts(records: &[Arc<Report>]) -> ReportCounts {
        ReportCounts::tally(records)
    }
}

/// Backup jobs keep the order of the first fetch so rows do not jump
/// while the fast poll runs.
#[derive(Debug, Clone, Copy)]
pub struct BackupJobs;

impl Domain for BackupJobs {
    type Raw = RawBackupJob;
    type Record = BackupJob;
    type Counts = JobCounts;
    const NAME: &'static str = "backup_jobs";
    const ORDER: OrderMode = OrderMode::AppendOnly;

    fn normalize(raw: &RawBackupJob, now: DateTime<Utc>) -> Result<BackupJob, ShapeError> {
        normalize::normalize_backup_job(raw, now)
    }
    fn sort(records: Vec<BackupJob>) -> Vec<BackupJob> {
        sort::by_name(records)
    }
    fn counts(records: &[Arc<BackupJob>]) -> JobCounts {
        JobCounts::tally(records)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn malformed_records_are_dropped_not_fatal() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let payload = vec![
            json!({ "first_ai_response": "a", "last_seen_at": "2025-06-01T10:00:00Z", "id": "old" }),
            json!("not an object"),
            json!({ "last_seen_at": "2025-06-01T11:00:00Z" }),
            json!({ "first_ai_response": "b", "last_seen_at": "2025-06-01T11:30:00Z", "id": "new" }),
            json!(null),
        ];

        let alerts = normalize_batch::<Alerts>(payload, now);
        let ids: Vec<_> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
    }

    #[test]
    fn hosts_come_out_by_name() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let hosts = normalize_batch::<Hosts>(
            vec![
                json!({ "hostid": "2", "name": "web" }),
                json!({ "hostid": "1", "name": "Api" }),
                json!({ "name": "no id" }),
            ],
            now,
        );
        let names: Vec<_> = hosts.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["Api", "web"]);
    }
}
