use serde_json::Value;
use tracing::debug;
use vigil_api::RawRecord;
use vigil_api::models::{RawAdminEvent, RawUserEvent};

use super::{first_present, parse_timestamp};
use crate::model::{LogSeverity, LogSource, SystemLogEntry};

/// Normalize one user event. Events without a usable time are dropped.
pub fn normalize_user_event(raw: &RawUserEvent, index: usize) -> Option<SystemLogEntry> {
    let time_raw = first_present([raw.time.as_deref()])?;
    let timestamp = parse_timestamp(time_raw)?;
    let event = first_present([raw.kind.as_deref()]).unwrap_or("UNKNOWN");
    let error = first_present([raw.error.as_deref()]);

    let details_map = raw.details.as_ref();
    let user = first_present([
        details_map
            .and_then(|d| d.get("username"))
            .and_then(Value::as_str),
        raw.user_id.as_deref(),
    ])
    .unwrap_or("system");

    let mut parts: Vec<String> = details_map
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| scalar(value).map(|v| format!("{key}: {v}")))
        .collect();
    if let Some(client) = first_present([raw.client_id.as_deref()]) {
        parts.insert(0, format!("client: {client}"));
    }
    if let Some(error) = error {
        parts.push(format!("error: {error}"));
    }

    Some(SystemLogEntry {
        id: format!("user-{time_raw}-{index}"),
        timestamp,
        event: event.to_owned(),
        user: user.to_owned(),
        ip_address: first_present([raw.ip_address.as_deref()])
            .unwrap_or_default()
            .to_owned(),
        source: LogSource::User,
        severity: infer_log_severity(event, error.is_some()),
        details: parts.join(", "),
        read: false,
    })
}

/// Normalize one admin event. Events without a usable time are dropped.
pub fn normalize_admin_event(raw: &RawAdminEvent, index: usize) -> Option<SystemLogEntry> {
    let time_raw = first_present([raw.time.as_deref()])?;
    let timestamp = parse_timestamp(time_raw)?;
    let operation = first_present([raw.operation_type.as_deref()]).unwrap_or("UNKNOWN");
    let resource = first_present([raw.resource_type.as_deref()]);
    let error = first_present([raw.error.as_deref()]);
    let auth = raw.auth_details.as_ref();

    let event = resource.map_or_else(|| operation.to_owned(), |r| format!("{operation}_{r}"));
    let mut details = [Some(operation), resource, first_present([raw.resource_path.as_deref()])]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");
    if let Some(error) = error {
        details.push_str(&format!(" (error: {error})"));
    }

    Some(SystemLogEntry {
        id: format!("admin-{time_raw}-{index}"),
        timestamp,
        severity: infer_log_severity(&event, error.is_some()),
        event,
        user: first_present([auth.and_then(|a| a.user_id.as_deref())])
            .unwrap_or("system")
            .to_owned(),
        ip_address: first_present([auth.and_then(|a| a.ip_address.as_deref())])
            .unwrap_or_default()
            .to_owned(),
        source: LogSource::Admin,
        details,
        read: false,
    })
}

/// Merge both event feeds into one list, newest first.
pub fn aggregate_system_logs(
    user_events: Vec<Value>,
    admin_events: Vec<Value>,
) -> Vec<SystemLogEntry> {
    let user = user_events
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| RawUserEvent::from_value(v).and_then(|raw| normalize_user_event(&raw, i)));
    let admin = admin_events
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| RawAdminEvent::from_value(v).and_then(|raw| normalize_admin_event(&raw, i)));

    let mut entries: Vec<SystemLogEntry> = user.chain(admin).collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    debug!(count = entries.len(), "aggregated system log entries");
    entries
}

fn infer_log_severity(event: &str, has_error: bool) -> LogSeverity {
    let lower = event.to_ascii_lowercase();
    if has_error || lower.contains("error") || lower.contains("fail") {
        LogSeverity::Error
    } else if ["delete", "remove", "logout", "reset"]
        .iter()
        .any(|word| lower.contains(word))
    {
        LogSeverity::Warning
    } else {
        LogSeverity::Info
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
