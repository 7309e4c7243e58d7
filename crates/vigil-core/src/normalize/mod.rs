// ── Field-fallback normalizer ──
//
// Maps the partially reliable raw webhook records onto the dashboard
// model. Each output field reads an ordered list of candidate raw
// fields and takes the first usable one; anything else resolves to a
// documented default. A record is rejected only when a required field
// is missing.

mod alerts;
mod backup;
mod hosts;
mod reports;
mod system_logs;

pub use alerts::normalize_alert;
pub use backup::normalize_backup_job;
pub use hosts::normalize_host;
pub use reports::normalize_report;
pub use system_logs::{aggregate_system_logs, normalize_admin_event, normalize_user_event};

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

use crate::error::ShapeError;
use crate::model::{Category, Severity};

pub(crate) const UNKNOWN_HOST: &str = "unknown-host";

/// Epoch values above this are milliseconds, below it seconds.
const EPOCH_MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

/// First candidate that is present, non-null, and not blank.
pub(crate) fn first_present<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
}

pub(crate) fn required<'a>(
    value: Option<&'a str>,
    domain: &'static str,
    field: &'static str,
) -> Result<&'a str, ShapeError> {
    value.ok_or(ShapeError::MissingField { domain, field })
}

// ── Severity / category ──────────────────────────────────────────────

/// Map a raw severity to the five-level scale.
///
/// Numeric Zabbix priorities map directly (5 disaster .. 2 warning, below
/// that info). Text is matched by substring, most severe first, so
/// `"Disaster"` and `"not classified"` both land somewhere sensible.
pub fn map_severity(raw: &str) -> Severity {
    let raw = raw.trim();
    if let Ok(level) = raw.parse::<i64>() {
        return match level {
            5.. => Severity::Disaster,
            4 => Severity::High,
            3 => Severity::Average,
            2 => Severity::Warning,
            _ => Severity::Info,
        };
    }

    let lower = raw.to_ascii_lowercase();
    if lower.contains("disaster") {
        Severity::Disaster
    } else if lower.contains("high") {
        Severity::High
    } else if lower.contains("average") {
        Severity::Average
    } else if lower.contains("warning") {
        Severity::Warning
    } else {
        Severity::Info
    }
}

const CATEGORY_KEYWORDS: [(&str, Category); 7] = [
    ("vmware", Category::VMware),
    ("disk", Category::Disk),
    ("cpu", Category::Cpu),
    ("memory", Category::Memory),
    ("network", Category::Network),
    ("database", Category::Database),
    ("service", Category::Service),
];

/// First keyword found in the problem name or description wins.
pub fn infer_category(name: &str, description: &str) -> Category {
    let haystack = format!("{name} {description}").to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(keyword, _)| haystack.contains(keyword))
        .map_or(Category::System, |(_, category)| *category)
}

// ── Time ─────────────────────────────────────────────────────────────

/// Human duration label: `"42m"`, `"3h 7m"`, `"2d 5h"`.
///
/// Negative spans (clock skew) read as `"0m"`.
pub fn duration_label(span: TimeDelta) -> String {
    let minutes = span.num_minutes().max(0);
    if minutes < 60 {
        format!("{minutes}m")
    } else if minutes < 24 * 60 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        let hours = minutes / 60;
        format!("{}d {}h", hours / 24, hours % 24)
    }
}

/// Parse the timestamp shapes the webhooks emit.
///
/// Accepts RFC 3339, naive `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`
/// (read as UTC), and epoch seconds or milliseconds. Zero and negative
/// epochs mean "unset".
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Some(epoch) = parse_epoch(raw) {
        return if epoch >= EPOCH_MILLIS_THRESHOLD {
            DateTime::from_timestamp_millis(epoch)
        } else {
            DateTime::from_timestamp(epoch, 0)
        };
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Epoch seconds from a Zabbix clock field. `"0"` means unset.
pub fn parse_clock(raw: &str) -> Option<i64> {
    parse_epoch(raw.trim())
}

fn parse_epoch(raw: &str) -> Option<i64> {
    let value = raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(truncate_to_i64)
    })?;
    (value > 0).then_some(value)
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn truncate_to_i64(value: f64) -> i64 {
    value.trunc() as i64
}

// ── Scalars ──────────────────────────────────────────────────────────

/// `"1"`, `"true"`, `"yes"` and any non-zero number are truthy.
pub(crate) fn is_truthy(raw: &str) -> bool {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<f64>() {
        return n.abs() > 0.0;
    }
    matches!(raw.to_ascii_lowercase().as_str(), "true" | "yes" | "on")
}

/// A number that may carry a trailing `%`.
pub(crate) fn parse_number(raw: &str) -> Option<f64> {
    raw.trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
}

pub(crate) fn parse_count(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    raw.parse::<u32>().ok().or_else(|| {
        parse_number(raw)
            .filter(|n| *n >= 0.0)
            .map(saturating_u32)
    })
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn saturating_u32(value: f64) -> u32 {
    value.trunc().min(f64::from(u32::MAX)) as u32
}
