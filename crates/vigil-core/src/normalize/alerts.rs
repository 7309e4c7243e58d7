use chrono::{DateTime, SecondsFormat, Utc};
use vigil_api::models::RawAlert;

use super::{
    UNKNOWN_HOST, duration_label, first_present, infer_category, is_truthy, map_severity,
    parse_clock, parse_count, parse_timestamp, required,
};
use crate::error::ShapeError;
use crate::model::{Alert, AlertStatus, Severity};

const DOMAIN: &str = "alerts";
const UNKNOWN_PROBLEM: &str = "Unknown Problem";

/// Normalize one AI-insight record.
///
/// Problem fields are read from `raw_event` first, then `zbx_raw`, then the
/// top level. Records without both an AI response and a last-seen stamp are
/// rejected.
pub fn normalize_alert(raw: &RawAlert, now: DateTime<Utc>) -> Result<Alert, ShapeError> {
    let ai_response = required(
        first_present([raw.first_ai_response.as_deref()]),
        DOMAIN,
        "first_ai_response",
    )?;
    let last_seen_raw = required(
        first_present([raw.last_seen_at.as_deref()]),
        DOMAIN,
        "last_seen_at",
    )?;

    let event = raw.raw_event.as_ref();
    let zbx = raw.zbx_raw.as_ref();

    let severity = first_present([
        event.and_then(|e| e.severity.as_deref()),
        zbx.and_then(|z| z.severity.as_deref()),
        raw.severity.as_deref(),
    ])
    .map_or(Severity::Info, map_severity);

    let host = first_present([
        event.and_then(|e| e.host.as_deref()),
        zbx.and_then(|z| z.host.as_deref()),
        raw.host.as_deref(),
        raw.hostname.as_deref(),
    ])
    .unwrap_or(UNKNOWN_HOST);

    let problem = first_present([
        event.and_then(|e| e.name.as_deref()),
        zbx.and_then(|z| z.name.as_deref()),
        raw.problem.as_deref(),
        raw.name.as_deref(),
    ])
    .unwrap_or(UNKNOWN_PROBLEM);

    let description = first_present([
        raw.description.as_deref(),
        zbx.and_then(|z| z.description.as_deref()),
        event.and_then(|e| e.description.as_deref()),
    ])
    .unwrap_or_default();

    let clock = first_present([
        event.and_then(|e| e.clock.as_deref()),
        zbx.and_then(|z| z.clock.as_deref()),
        raw.clock.as_deref(),
    ])
    .and_then(parse_clock);

    let last_seen = parse_timestamp(last_seen_raw);
    let first_seen = first_present([raw.created_at.as_deref(), raw.first_seen_at.as_deref()])
        .and_then(parse_timestamp)
        .or_else(|| clock.and_then(|secs| DateTime::from_timestamp(secs, 0)));

    let resolved = first_present([
        event.and_then(|e| e.r_clock.as_deref()),
        zbx.and_then(|z| z.r_clock.as_deref()),
        raw.r_clock.as_deref(),
    ])
    .and_then(parse_clock)
    .is_some();

    let acknowledged = resolved
        || [
            event.and_then(|e| e.acknowledged.as_deref()),
            zbx.and_then(|z| z.acknowledged.as_deref()),
            raw.acknowledged.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(is_truthy);

    let status = if resolved {
        AlertStatus::Resolved
    } else if acknowledged {
        AlertStatus::Acknowledged
    } else {
        AlertStatus::Active
    };

    let duration = first_seen
        .or(last_seen)
        .map_or_else(|| "0m".to_owned(), |start| duration_label(now - start));

    let id = first_present([
        raw.id.as_deref(),
        raw.event_id.as_deref(),
        event.and_then(|e| e.eventid.as_deref()),
        zbx.and_then(|z| z.eventid.as_deref()),
    ])
    .map_or_else(
        || {
            let stamp = first_seen.map_or_else(
                || clock.map_or_else(|| last_seen_raw.to_owned(), |c| c.to_string()),
                |t| t.to_rfc3339_opts(SecondsFormat::Secs, true),
            );
            format!("{problem}|{stamp}|{host}")
        },
        str::to_owned,
    );

    Ok(Alert {
        id,
        host: host.to_owned(),
        problem: problem.to_owned(),
        description: description.to_owned(),
        severity,
        status,
        category: infer_category(problem, description),
        acknowledged,
        resolved,
        first_seen,
        last_seen,
        clock,
        duration,
        ai_response: ai_response.to_owned(),
        occurrences: raw
            .occurrences
            .as_deref()
            .and_then(parse_count)
            .filter(|n| *n > 0)
            .unwrap_or(1),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Category;
    use chrono::{TimeDelta, TimeZone};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use vigil_api::RawRecord;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn raw(value: Value) -> RawAlert {
        RawAlert::from_value(value).unwrap()
    }

    #[test]
    fn full_zabbix_shape() {
        let alert = normalize_alert(
            &raw(json!({
                "first_ai_response": "Disk is filling up; rotate logs.",
                "last_seen_at": "2025-06-01T11:55:00Z",
                "created_at": "2025-06-01T09:30:00Z",
                "occurrences": 4,
                "raw_event": {
                    "eventid": "9001",
                    "severity": "High",
                    "host": "db-01",
                    "name": "Free disk space is below 10%",
                    "clock": "1748770200",
                    "r_clock": "0",
                    "acknowledged": "0"
                }
            })),
            now(),
        )
        .unwrap();

        assert_eq!(alert.id, "9001");
        assert_eq!(alert.host, "db-01");
        assert_eq!(alert.problem, "Free disk space is below 10%");
        assert_eq!(alert.severity, Severity::High);
        assert_eq!(alert.status, AlertStatus::Active);
        assert_eq!(alert.category, Category::Disk);
        assert_eq!(alert.duration, "2h 30m");
        assert_eq!(alert.occurrences, 4);
        assert_eq!(alert.clock, Some(1_748_770_200));
        assert!(!alert.resolved);
    }

    #[test]
    fn severity_prefers_zbx_raw_over_top_level() {
        let alert = normalize_alert(
            &raw(json!({
                "first_ai_response": "x",
                "last_seen_at": "2025-06-01T11:00:00Z",
                "severity": "warning",
                "zbx_raw": { "severity": "Average" }
            })),
            now(),
        )
        .unwrap();
        assert_eq!(alert.severity, Severity::Average);
    }

    #[test]
    fn missing_required_fields_reject_the_record() {
        let err = normalize_alert(&raw(json!({ "last_seen_at": "2025-06-01T11:00:00Z" })), now())
            .unwrap_err();
        assert_eq!(
            err,
            ShapeError::MissingField {
                domain: "alerts",
                field: "first_ai_response"
            }
        );

        let err = normalize_alert(&raw(json!({ "first_ai_response": "x" })), now()).unwrap_err();
        assert_eq!(
            err,
            ShapeError::MissingField {
                domain: "alerts",
                field: "last_seen_at"
            }
        );
    }

    #[test]
    fn defaults_and_synthesized_id() {
        let alert = normalize_alert(
            &raw(json!({
                "first_ai_response": "x",
                "last_seen_at": "2025-06-01T11:00:00Z",
                "clock": 1_748_775_600
            })),
            now(),
        )
        .unwrap();

        assert_eq!(alert.host, "unknown-host");
        assert_eq!(alert.problem, "Unknown Problem");
        assert_eq!(alert.description, "");
        assert_eq!(alert.severity, Severity::Info);
        assert_eq!(alert.category, Category::System);
        assert_eq!(alert.occurrences, 1);
        assert_eq!(alert.id, "Unknown Problem|2025-06-01T11:00:00Z|unknown-host");
        assert_eq!(alert.duration, "1h 0m");
    }

    #[test]
    fn resolution_implies_acknowledged() {
        let alert = normalize_alert(
            &raw(json!({
                "first_ai_response": "x",
                "last_seen_at": "2025-06-01T11:00:00Z",
                "zbx_raw": { "r_clock": "1748775600", "acknowledged": "0" }
            })),
            now(),
        )
        .unwrap();
        assert!(alert.resolved);
        assert!(alert.acknowledged);
        assert_eq!(alert.status, AlertStatus::Resolved);

        let alert = normalize_alert(
            &raw(json!({
                "first_ai_response": "x",
                "last_seen_at": "2025-06-01T11:00:00Z",
                "acknowledged": true
            })),
            now(),
        )
        .unwrap();
        assert!(!alert.resolved);
        assert_eq!(alert.status, AlertStatus::Acknowledged);
    }

    #[test]
    fn future_start_reads_as_zero_minutes() {
        let alert = normalize_alert(
            &raw(json!({
                "first_ai_response": "x",
                "last_seen_at": "2025-06-01T11:00:00Z",
                "created_at": (now() + TimeDelta::hours(1)).to_rfc3339()
            })),
            now(),
        )
        .unwrap();
        assert_eq!(alert.duration, "0m");
    }

    #[test]
    fn normalizing_twice_gives_equal_alerts() {
        let record = raw(json!({
            "first_ai_response": "Restart the collector.",
            "last_seen_at": "2025-06-01T11:00:00Z",
            "severity": "Average",
            "hostname": "edge-02",
            "problem": "Network latency above 200ms",
            "clock": 1_748_770_200
        }));

        let first = normalize_alert(&record, now()).unwrap();
        let second = normalize_alert(&record, now()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.severity, Severity::Average);
    }
}
