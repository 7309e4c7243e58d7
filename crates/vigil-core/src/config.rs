// ── Runtime dashboard configuration ──
//
// Describes where each domain's webhook lives and how often to poll it.
// Carries the resolved token but never touches config files: the CLI
// builds a `DashboardConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;
use vigil_api::{Endpoint, TlsMode};

pub const ALERTS_INTERVAL: Duration = Duration::from_secs(30);
pub const HOSTS_INTERVAL: Duration = Duration::from_secs(60);
pub const REPORTS_INTERVAL: Duration = Duration::from_secs(120);
pub const BACKUP_JOBS_INTERVAL: Duration = Duration::from_secs(5);

/// Default trailing window for the reports request.
pub const REPORT_WINDOW_DAYS: u32 = 7;

/// Polling behavior for one domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// Cancel a still-running request when a newer one starts.
    pub abort_in_flight: bool,
}

impl PollSettings {
    pub const fn every(interval: Duration) -> Self {
        Self {
            interval,
            abort_in_flight: false,
        }
    }

    #[must_use]
    pub const fn abortable(mut self) -> Self {
        self.abort_in_flight = true;
        self
    }
}

/// One configured domain: its webhook and polling cadence.
#[derive(Debug, Clone)]
pub struct DomainEndpoint {
    pub endpoint: Endpoint,
    pub poll: PollSettings,
}

/// Everything needed to build a [`crate::Dashboard`].
///
/// Domains left as `None` are simply not polled.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub alerts: Option<DomainEndpoint>,
    pub hosts: Option<DomainEndpoint>,
    pub reports: Option<DomainEndpoint>,
    pub backup_jobs: Option<DomainEndpoint>,
    /// Identity-provider user events (system logs).
    pub user_events: Option<Url>,
    /// Identity-provider admin events (system logs).
    pub admin_events: Option<Url>,
    /// Bearer token for every webhook call. `None` sends no header.
    pub token: Option<SecretString>,
    pub tls: TlsMode,
    /// Per-request timeout. `None` waits as long as the server does.
    pub timeout: Option<Duration>,
    /// Reports are requested for the trailing N days.
    pub report_window_days: u32,
    /// Where the host snapshot cache lives. `None` disables caching.
    pub cache_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            alerts: None,
            hosts: None,
            reports: None,
            backup_jobs: None,
            user_events: None,
            admin_events: None,
            token: None,
            tls: TlsMode::System,
            timeout: None,
            report_window_days: REPORT_WINDOW_DAYS,
            cache_dir: None,
        }
    }
}
