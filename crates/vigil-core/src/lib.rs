// vigil-core: Data layer between vigil-api and consumers (CLI, dashboards).
//
// Raw webhook payloads go in; normalized, deterministically ordered,
// identity-preserving snapshots come out, refreshed on a timer.

pub mod clock;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod model;
pub mod normalize;
pub mod poller;
pub mod query;
pub mod sort;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DashboardConfig, DomainEndpoint, PollSettings};
pub use dashboard::Dashboard;
pub use domain::{Alerts, BackupJobs, Domain, Hosts, Reports};
pub use error::{CoreError, PersistenceError, ShapeError};
pub use fetch::{RecordSource, WebhookSource};
pub use poller::{ConnectionState, PollPhase, Poller, PollerView};
pub use query::{AlertFilter, HostFilter, JobFilter, ListQuery, Page, Searchable};
pub use store::{ChangeSet, HostCache, OrderMode, Reconciled, ReconciliationState, SnapshotStore};
pub use stream::EntityStream;

pub use model::{
    Alert, AlertCounts, AlertStatus, BackupJob, Category, Host, HostCounts, HostStatus, JobCounts,
    JobStatus, Keyed, LogSeverity, LogSource, Report, ReportCounts, Severity, SystemLogEntry,
};
