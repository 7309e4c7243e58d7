// ── Report domain types ──

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An AI-generated infrastructure report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub title: String,
    /// Free-form report type (`"daily"`, `"weekly"`, `"general"`, ...).
    pub kind: String,
    pub status: String,
    pub content: String,
    /// Whitespace-collapsed prefix of `content` for list views.
    pub excerpt: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub clock: Option<i64>,
    pub period_from: Option<DateTime<Utc>>,
    pub period_to: Option<DateTime<Utc>>,
    /// Time since the report was generated, e.g. `"3d 4h"`.
    pub age: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportCounts {
    pub total: usize,
    pub by_kind: BTreeMap<String, usize>,
}

impl ReportCounts {
    pub fn tally(reports: &[Arc<Report>]) -> Self {
        let mut by_kind = BTreeMap::new();
        for report in reports {
            *by_kind.entry(report.kind.clone()).or_insert(0) += 1;
        }
        Self {
            total: reports.len(),
            by_kind,
        }
    }
}
