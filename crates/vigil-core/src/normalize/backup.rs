use chrono::{DateTime, Utc};
use vigil_api::models::RawBackupJob;

use super::{duration_label, first_present, is_truthy, parse_count, parse_number, parse_timestamp};
use crate::error::ShapeError;
use crate::model::{BackupJob, JobStatus};

const DOMAIN: &str = "backup_jobs";

/// Normalize one Veeam job. A job needs either an identifier or a name.
pub fn normalize_backup_job(raw: &RawBackupJob, now: DateTime<Utc>) -> Result<BackupJob, ShapeError> {
    let ident = first_present([
        raw.id.as_deref(),
        raw.job_id.as_deref(),
        raw.instance_uid.as_deref(),
    ]);
    let name_raw = first_present([raw.name.as_deref()]);
    if ident.is_none() && name_raw.is_none() {
        return Err(ShapeError::MissingField {
            domain: DOMAIN,
            field: "id",
        });
    }

    let name = name_raw.unwrap_or("Unnamed Job");
    let job_type = first_present([raw.kind.as_deref(), raw.job_type.as_deref()]).unwrap_or("Backup");
    let session = raw.last_session.as_ref();
    let session_result = session.and_then(|s| s.result.as_ref());

    let disabled = raw.is_disabled.as_deref().is_some_and(is_truthy);
    let running = session
        .and_then(|s| s.state.as_deref())
        .is_some_and(is_running_state);
    let status = if disabled {
        JobStatus::Disabled
    } else if running {
        JobStatus::Running
    } else {
        map_result(first_present([
            session_result.and_then(|r| r.result.as_deref()),
            raw.last_result.as_deref(),
            raw.status.as_deref(),
        ]))
    };

    let started = session
        .and_then(|s| s.creation_time.as_deref())
        .and_then(parse_timestamp);
    let ended = session
        .and_then(|s| s.end_time.as_deref())
        .and_then(parse_timestamp);
    let last_run = ended
        .or_else(|| raw.last_run.as_deref().and_then(parse_timestamp))
        .or(started);

    let duration = match (started, ended) {
        (Some(start), Some(end)) => duration_label(end - start),
        _ => String::new(),
    };

    Ok(BackupJob {
        id: ident.map_or_else(|| format!("{job_type}|{name}"), str::to_owned),
        name: name.to_owned(),
        job_type: job_type.to_owned(),
        status,
        last_run,
        next_run: raw.next_run.as_deref().and_then(parse_timestamp),
        progress: session
            .and_then(|s| s.progress_percent.as_deref())
            .and_then(parse_number)
            .map_or(0, clamp_percent),
        message: first_present([session_result.and_then(|r| r.message.as_deref())])
            .unwrap_or_default()
            .to_owned(),
        objects: raw.objects_count.as_deref().and_then(parse_count).unwrap_or(0),
        repository: first_present([raw.repository_name.as_deref()])
            .unwrap_or_default()
            .to_owned(),
        duration,
        last_run_ago: last_run
            .map(|t| duration_label(now - t))
            .unwrap_or_default(),
    })
}

fn is_running_state(state: &str) -> bool {
    matches!(
        state.trim().to_ascii_lowercase().as_str(),
        "working" | "starting" | "running" | "resuming"
    )
}

fn map_result(result: Option<&str>) -> JobStatus {
    let Some(result) = result else {
        return JobStatus::Idle;
    };
    let lower = result.to_ascii_lowercase();
    if lower.contains("success") {
        JobStatus::Success
    } else if lower.contains("warn") {
        JobStatus::Warning
    } else if lower.contains("fail") || lower.contains("error") {
        JobStatus::Failed
    } else if lower.contains("running") || lower.contains("working") {
        JobStatus::Running
    } else if lower == "none" || lower == "idle" || lower == "stopped" {
        JobStatus::Idle
    } else if lower.contains("disabled") {
        JobStatus::Disabled
    } else {
        JobStatus::Unknown
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn clamp_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use vigil_api::RawRecord;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn job(value: Value) -> Result<BackupJob, ShapeError> {
        normalize_backup_job(&RawBackupJob::from_value(value).unwrap(), now())
    }

    #[test]
    fn veeam_job_with_finished_session() {
        let j = job(json!({
            "id": "5f1c",
            "name": "Nightly VMs",
            "type": "VSphereBackup",
            "objectsCount": 12,
            "repositoryName": "Primary SOBR",
            "nextRun": "2025-06-01T22:00:00Z",
            "lastSession": {
                "state": "Stopped",
                "creationTime": "2025-06-01T01:00:00Z",
                "endTime": "2025-06-01T02:12:00Z",
                "progressPercent": 100,
                "result": { "result": "Success", "message": "Processed 12 of 12 VMs" }
            }
        }))
        .unwrap();

        assert_eq!(j.id, "5f1c");
        assert_eq!(j.job_type, "VSphereBackup");
        assert_eq!(j.status, JobStatus::Success);
        assert_eq!(j.duration, "1h 12m");
        assert_eq!(j.last_run_ago, "9h 48m");
        assert_eq!(j.progress, 100);
        assert_eq!(j.objects, 12);
        assert_eq!(j.repository, "Primary SOBR");
        assert_eq!(j.message, "Processed 12 of 12 VMs");
    }

    #[test]
    fn working_session_means_running() {
        let j = job(json!({
            "id": "a",
            "name": "Files",
            "lastResult": "Failed",
            "lastSession": { "state": "Working", "progressPercent": 142.7 }
        }))
        .unwrap();
        assert_eq!(j.status, JobStatus::Running);
        assert_eq!(j.progress, 100);
    }

    #[test]
    fn disabled_beats_everything() {
        let j = job(json!({
            "name": "Old job",
            "isDisabled": true,
            "lastSession": { "state": "Working" }
        }))
        .unwrap();
        assert_eq!(j.status, JobStatus::Disabled);
        assert_eq!(j.id, "Backup|Old job");
    }

    #[test]
    fn result_mapping() {
        assert_eq!(map_result(Some("Warning")), JobStatus::Warning);
        assert_eq!(map_result(Some("Failed")), JobStatus::Failed);
        assert_eq!(map_result(Some("None")), JobStatus::Idle);
        assert_eq!(map_result(None), JobStatus::Idle);
        assert_eq!(map_result(Some("Mystery")), JobStatus::Unknown);
    }

    #[test]
    fn job_without_id_or_name_is_rejected() {
        assert!(job(json!({ "type": "Backup" })).is_err());
    }

    #[test]
    fn normalizing_twice_gives_equal_jobs() {
        let raw = RawBackupJob::from_value(json!({
            "name": "File share copy",
            "lastResult": "Warning",
            "lastRun": "2025-06-01T03:00:00Z",
            "lastSession": { "progressPercent": 140 }
        }))
        .unwrap();

        let first = normalize_backup_job(&raw, now()).unwrap();
        let second = normalize_backup_job(&raw, now()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.progress, 100);
    }
}
