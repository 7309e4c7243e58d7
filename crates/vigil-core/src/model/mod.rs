// ── Domain model ──
//
// Normalized dashboard records. Every field a consumer reads is always
// populated; absence upstream is resolved to a documented default by the
// normalizer.

mod alert;
mod backup;
mod host;
mod report;
mod system_log;

pub use alert::{Alert, AlertCounts, AlertStatus, Category, Severity};
pub use backup::{BackupJob, JobCounts, JobStatus};
pub use host::{Host, HostCounts, HostStatus};
pub use report::{Report, ReportCounts};
pub use system_log::{LogSeverity, LogSource, SystemLogEntry};

/// A record with a stable identity inside one snapshot.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Alert {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Host {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Report {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for BackupJob {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for SystemLogEntry {
    fn key(&self) -> &str {
        &self.id
    }
}
