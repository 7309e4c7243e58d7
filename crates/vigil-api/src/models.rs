// Raw webhook payload types
//
// Partial, optional-field models of what each webhook returns. Nothing is
// required at this layer: every field may be missing, null, or of an
// unexpected JSON type. Required-field policy lives in the normalizer.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::de;

/// A raw record type that can be read from one element of a webhook body.
pub trait RawRecord: DeserializeOwned {
    /// Read one record. Non-object values yield `None`.
    fn from_value(value: Value) -> Option<Self> {
        if value.is_object() {
            serde_json::from_value(value).ok()
        } else {
            None
        }
    }
}

// ── Alerts (AI insights webhook) ─────────────────────────────────────

/// One AI-annotated problem from the insights webhook.
///
/// The problem itself may be described up to three times: in `raw_event`
/// (the event forwarded by the workflow), in `zbx_raw` (the untouched
/// Zabbix problem) and in the top-level fields (legacy shape).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAlert {
    #[serde(deserialize_with = "de::loose_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub event_id: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub first_ai_response: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub last_seen_at: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub created_at: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub first_seen_at: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub severity: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub host: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub hostname: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub problem: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub clock: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub r_clock: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub acknowledged: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub occurrences: Option<String>,
    #[serde(deserialize_with = "de::lenient")]
    pub raw_event: Option<RawZabbixEvent>,
    #[serde(deserialize_with = "de::lenient")]
    pub zbx_raw: Option<RawZabbixEvent>,
}

impl RawRecord for RawAlert {}

/// A Zabbix problem/event as embedded in an alert payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawZabbixEvent {
    #[serde(deserialize_with = "de::loose_string")]
    pub eventid: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub severity: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub host: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub description: Option<String>,
    /// Event time, epoch seconds.
    #[serde(deserialize_with = "de::loose_string")]
    pub clock: Option<String>,
    /// Resolution time, epoch seconds. `"0"` while the problem is open.
    #[serde(deserialize_with = "de::loose_string")]
    pub r_clock: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub acknowledged: Option<String>,
}

// ── Hosts (Zabbix host.get) ──────────────────────────────────────────

/// A monitored host as returned by the Zabbix hosts webhook.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawHost {
    #[serde(deserialize_with = "de::loose_string")]
    pub hostid: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub host_id: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub id: Option<String>,
    /// Technical host name.
    #[serde(deserialize_with = "de::loose_string")]
    pub host: Option<String>,
    /// Visible name.
    #[serde(deserialize_with = "de::loose_string")]
    pub name: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub visible_name: Option<String>,
    /// `"0"` monitored, `"1"` disabled.
    #[serde(deserialize_with = "de::loose_string")]
    pub status: Option<String>,
    /// `"0"` unknown, `"1"` available, `"2"` unavailable.
    #[serde(deserialize_with = "de::loose_string")]
    pub available: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub ip: Option<String>,
    #[serde(deserialize_with = "de::lenient_vec")]
    pub interfaces: Vec<RawHostInterface>,
    #[serde(alias = "hostgroups", deserialize_with = "de::lenient_vec")]
    pub groups: Vec<RawHostGroup>,
    #[serde(deserialize_with = "de::loose_string")]
    pub os: Option<String>,
    #[serde(deserialize_with = "de::lenient")]
    pub inventory: Option<RawHostInventory>,
    #[serde(deserialize_with = "de::loose_string")]
    pub problems: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub problem_count: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub cpu: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub memory: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub disk: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub lastaccess: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub last_seen: Option<String>,
}

impl RawRecord for RawHost {}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawHostInterface {
    #[serde(deserialize_with = "de::loose_string")]
    pub ip: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub dns: Option<String>,
    /// `"1"` for the default interface of its type.
    #[serde(deserialize_with = "de::loose_string")]
    pub main: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawHostGroup {
    #[serde(deserialize_with = "de::loose_string")]
    pub groupid: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawHostInventory {
    #[serde(deserialize_with = "de::loose_string")]
    pub os: Option<String>,
}

// ── Reports (AI reports webhook) ─────────────────────────────────────

/// A generated report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawReport {
    #[serde(deserialize_with = "de::loose_string")]
    pub id: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub report_id: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub name: Option<String>,
    #[serde(rename = "type", deserialize_with = "de::loose_string")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub report_type: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub content: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub summary: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub report: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub created_at: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub generated_at: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub updated_at: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub clock: Option<String>,
    #[serde(deserialize_with = "de::lenient")]
    pub period: Option<RawPeriod>,
    #[serde(deserialize_with = "de::loose_string")]
    pub from: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub to: Option<String>,
}

impl RawRecord for RawReport {}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPeriod {
    #[serde(deserialize_with = "de::loose_string")]
    pub from: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub to: Option<String>,
}

// ── Backup jobs (Veeam Backup & Replication) ─────────────────────────

/// A job as returned by the Veeam B&R webhook (REST API shape, camelCase).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawBackupJob {
    #[serde(deserialize_with = "de::loose_string")]
    pub id: Option<String>,
    #[serde(rename = "job_id", deserialize_with = "de::loose_string")]
    pub job_id: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub instance_uid: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub name: Option<String>,
    #[serde(rename = "type", deserialize_with = "de::loose_string")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub job_type: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub status: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub last_result: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub last_run: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub next_run: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub is_disabled: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub objects_count: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub repository_name: Option<String>,
    #[serde(deserialize_with = "de::lenient")]
    pub last_session: Option<RawJobSession>,
}

impl RawRecord for RawBackupJob {}

/// The most recent session of a job.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawJobSession {
    /// `Stopped`, `Starting`, `Working`, `Stopping`, ...
    #[serde(deserialize_with = "de::loose_string")]
    pub state: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub creation_time: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub end_time: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub progress_percent: Option<String>,
    #[serde(deserialize_with = "de::lenient")]
    pub result: Option<RawSessionResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSessionResult {
    /// `Success`, `Warning`, `Failed`, `None`.
    #[serde(deserialize_with = "de::loose_string")]
    pub result: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub message: Option<String>,
}

// ── Admin events (identity provider admin API) ───────────────────────

/// A user (login/logout/...) event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawUserEvent {
    /// Epoch milliseconds.
    #[serde(deserialize_with = "de::loose_string")]
    pub time: Option<String>,
    #[serde(rename = "type", deserialize_with = "de::loose_string")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub ip_address: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub client_id: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub error: Option<String>,
    #[serde(deserialize_with = "de::lenient_map")]
    pub details: Option<Map<String, Value>>,
}

impl RawRecord for RawUserEvent {}

/// An administrative (resource change) event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawAdminEvent {
    /// Epoch milliseconds.
    #[serde(deserialize_with = "de::loose_string")]
    pub time: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub operation_type: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub resource_type: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub resource_path: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub error: Option<String>,
    #[serde(deserialize_with = "de::lenient")]
    pub auth_details: Option<RawAuthDetails>,
}

impl RawRecord for RawAdminEvent {}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawAuthDetails {
    #[serde(deserialize_with = "de::loose_string")]
    pub user_id: Option<String>,
    #[serde(deserialize_with = "de::loose_string")]
    pub ip_address: Option<String>,
}
