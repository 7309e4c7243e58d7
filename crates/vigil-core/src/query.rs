// ── Search, filters and paging ──
//
// Consumer-side views over a published snapshot. Nothing here touches
// the network or the reconciliation state.

use std::sync::Arc;

use serde::Serialize;

use crate::model::{
    Alert, AlertStatus, BackupJob, Host, HostStatus, JobStatus, Report, Severity, SystemLogEntry,
};

/// Free-text search over a record's user-visible fields.
pub trait Searchable {
    /// `needle` is already lowercased.
    fn matches(&self, needle: &str) -> bool;
}

fn any_contains(needle: &str, fields: &[&str]) -> bool {
    fields.iter().any(|f| f.to_lowercase().contains(needle))
}

impl Searchable for Alert {
    fn matches(&self, needle: &str) -> bool {
        any_contains(
            needle,
            &[&self.host, &self.problem, &self.description, &self.ai_response],
        )
    }
}

impl Searchable for Host {
    fn matches(&self, needle: &str) -> bool {
        any_contains(needle, &[&self.name, &self.hostname, &self.ip, &self.os])
            || self.groups.iter().any(|g| g.to_lowercase().contains(needle))
    }
}

impl Searchable for Report {
    fn matches(&self, needle: &str) -> bool {
        any_contains(needle, &[&self.title, &self.kind, &self.content])
    }
}

impl Searchable for BackupJob {
    fn matches(&self, needle: &str) -> bool {
        any_contains(
            needle,
            &[&self.name, &self.job_type, &self.repository, &self.message],
        )
    }
}

impl Searchable for SystemLogEntry {
    fn matches(&self, needle: &str) -> bool {
        any_contains(
            needle,
            &[&self.event, &self.user, &self.ip_address, &self.details],
        )
    }
}

// ── Filters ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AlertFilter {
    #[default]
    All,
    /// At least this severe.
    MinSeverity(Severity),
    Status(AlertStatus),
    /// Not yet resolved.
    Open,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        match self {
            Self::All => true,
            Self::MinSeverity(min) => alert.severity >= *min,
            Self::Status(status) => alert.status == *status,
            Self::Open => !alert.resolved,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostFilter {
    #[default]
    All,
    Status(HostStatus),
    WithProblems,
}

impl HostFilter {
    pub fn matches(&self, host: &Host) -> bool {
        match self {
            Self::All => true,
            Self::Status(status) => host.status == *status,
            Self::WithProblems => host.problem_count > 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobFilter {
    #[default]
    All,
    Status(JobStatus),
}

impl JobFilter {
    pub fn matches(&self, job: &BackupJob) -> bool {
        match self {
            Self::All => true,
            Self::Status(status) => job.status == *status,
        }
    }
}

// ── Paging ───────────────────────────────────────────────────────────

/// Search text plus a 1-based page window. `page_size == 0` returns
/// everything on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: usize,
    pub page_size: usize,
}

/// One page of a filtered snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<Arc<T>>,
    pub page: usize,
    pub page_size: usize,
    /// Matches across all pages.
    pub total: usize,
    pub total_pages: usize,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    #[must_use]
    pub fn page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    /// Filter `data` by the search text and `filter`, then cut one page.
    /// Pages past the end come back empty; page 0 reads as page 1.
    pub fn apply<T, F>(&self, data: &[Arc<T>], filter: F) -> Page<T>
    where
        T: Searchable,
        F: Fn(&T) -> bool,
    {
        let needle = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let matched: Vec<Arc<T>> = data
            .iter()
            .filter(|item| {
                let item: &T = item;
                filter(item) && needle.as_deref().is_none_or(|n| item.matches(n))
            })
            .cloned()
            .collect();

        let total = matched.len();
        let page = self.page.max(1);
        if self.page_size == 0 {
            return Page {
                items: matched,
                page: 1,
                page_size: total,
                total,
                total_pages: usize::from(total > 0),
            };
        }

        let total_pages = total.div_ceil(self.page_size);
        let items = matched
            .into_iter()
            .skip((page - 1).saturating_mul(self.page_size))
            .take(self.page_size)
            .collect();
        Page {
            items,
            page,
            page_size: self.page_size,
            total,
            total_pages,
        }
    }
}
