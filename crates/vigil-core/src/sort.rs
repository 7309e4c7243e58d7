// ── Deterministic ordering ──
//
// Time-ordered domains list newest first by the best timestamp a record
// carries; hosts and jobs list by name. Both sorts are stable, so records
// with equal keys keep their upstream order.

use chrono::{DateTime, Utc};

use crate::model::{Alert, BackupJob, Host, Report, SystemLogEntry};

/// Timestamps a record can be ordered by, most preferred first.
pub trait Timeline {
    /// When the record last changed upstream.
    fn last_activity(&self) -> Option<DateTime<Utc>>;
    /// When the record was created.
    fn created(&self) -> Option<DateTime<Utc>> {
        None
    }
    /// Raw epoch-seconds clock, when nothing better exists.
    fn raw_clock(&self) -> Option<i64> {
        None
    }
}

/// A record listed alphabetically.
pub trait Named {
    fn name(&self) -> &str;
}

/// Sort key in epoch milliseconds. Records without any time sort last.
pub fn sort_key<T: Timeline>(record: &T) -> i64 {
    record
        .last_activity()
        .or_else(|| record.created())
        .map(|t| t.timestamp_millis())
        .or_else(|| record.raw_clock().map(|c| c.saturating_mul(1000)))
        .unwrap_or(0)
}

/// Stable newest-first sort.
pub fn newest_first<T: Timeline>(mut records: Vec<T>) -> Vec<T> {
    records.sort_by_key(|r| std::cmp::Reverse(sort_key(r)));
    records
}

/// Stable case-insensitive name sort; exact name breaks ties.
pub fn by_name<T: Named>(mut records: Vec<T>) -> Vec<T> {
    records.sort_by(|a, b| {
        a.name()
            .to_lowercase()
            .cmp(&b.name().to_lowercase())
            .then_with(|| a.name().cmp(b.name()))
    });
    records
}

// ── Per-domain keys ──────────────────────────────────────────────────

impl Timeline for Alert {
    fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }
    fn created(&self) -> Option<DateTime<Utc>> {
        self.first_seen
    }
    fn raw_clock(&self) -> Option<i64> {
        self.clock
    }
}

impl Timeline for Report {
    fn last_activity(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
    fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
    fn raw_clock(&self) -> Option<i64> {
        self.clock
    }
}

impl Timeline for SystemLogEntry {
    fn last_activity(&self) -> Option<DateTime<Utc>> {
        Some(self.timestamp)
    }
}

impl Named for Host {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for BackupJob {
    fn name(&self) -> &str {
        &self.name
    }
}
