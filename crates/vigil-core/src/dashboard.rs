// ── Dashboard facade ──
//
// Owns the shared webhook client and one poller per configured domain.
// Consumers subscribe through the per-domain accessors.

use std::sync::Arc;

use tracing::info;
use vigil_api::{
    Endpoint, NoAuth, StaticToken, TokenProvider, TransportConfig, WebhookClient,
};

use crate::clock::{Clock, SystemClock};
use crate::config::DashboardConfig;
use crate::domain::{Alerts, BackupJobs, Hosts, Reports};
use crate::error::CoreError;
use crate::fetch::WebhookSource;
use crate::model::SystemLogEntry;
use crate::normalize::aggregate_system_logs;
use crate::poller::Poller;
use crate::store::HostCache;

pub type AlertPoller = Poller<Alerts, WebhookSource>;
pub type HostPoller = Poller<Hosts, WebhookSource>;
pub type ReportPoller = Poller<Reports, WebhookSource>;
pub type BackupJobPoller = Poller<BackupJobs, WebhookSource>;

/// All dashboard domains behind one handle. Cheap to clone.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    client: WebhookClient,
    alerts: Option<AlertPoller>,
    hosts: Option<HostPoller>,
    reports: Option<ReportPoller>,
    backup_jobs: Option<BackupJobPoller>,
    user_events: Option<Endpoint>,
    admin_events: Option<Endpoint>,
}

impl Dashboard {
    /// Build the client and pollers. Does not fetch anything; call
    /// [`start_all`](Self::start_all) or refresh individual domains.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: DashboardConfig, clock: Arc<dyn Clock>) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: config.tls.clone(),
            timeout: config.timeout,
        };
        let tokens: Arc<dyn TokenProvider> = match config.token {
            Some(token) => Arc::new(StaticToken::new(token)),
            None => Arc::new(NoAuth),
        };
        let client = WebhookClient::new(&transport, tokens)?;
        let source = |endpoint: Endpoint| WebhookSource::new(client.clone(), endpoint);

        let alerts = config
            .alerts
            .map(|d| Poller::new(source(d.endpoint), d.poll, Arc::clone(&clock)));

        let hosts = config.hosts.map(|d| match &config.cache_dir {
            Some(dir) => Poller::with_cache(
                source(d.endpoint),
                d.poll,
                Arc::clone(&clock),
                Arc::new(HostCache::new(dir, Arc::clone(&clock))),
            ),
            None => Poller::new(source(d.endpoint), d.poll, Arc::clone(&clock)),
        });

        let reports = config.reports.map(|d| {
            Poller::new(
                source(d.endpoint).with_trailing_days(config.report_window_days, Arc::clone(&clock)),
                d.poll,
                Arc::clone(&clock),
            )
        });

        let backup_jobs = config
            .backup_jobs
            .map(|d| Poller::new(source(d.endpoint), d.poll, Arc::clone(&clock)));

        Ok(Self {
            inner: Arc::new(DashboardInner {
                alerts,
                hosts,
                reports,
                backup_jobs,
                user_events: config.user_events.map(Endpoint::get),
                admin_events: config.admin_events.map(Endpoint::get),
                client,
            }),
        })
    }

    pub fn client(&self) -> &WebhookClient {
        &self.inner.client
    }

    // ── Domains ──────────────────────────────────────────────────────

    pub fn alerts(&self) -> Result<&AlertPoller, CoreError> {
        configured(self.inner.alerts.as_ref(), "alerts")
    }

    pub fn hosts(&self) -> Result<&HostPoller, CoreError> {
        configured(self.inner.hosts.as_ref(), "hosts")
    }

    pub fn reports(&self) -> Result<&ReportPoller, CoreError> {
        configured(self.inner.reports.as_ref(), "reports")
    }

    pub fn backup_jobs(&self) -> Result<&BackupJobPoller, CoreError> {
        configured(self.inner.backup_jobs.as_ref(), "backup_jobs")
    }

    /// Names of the domains this dashboard polls.
    pub fn domains(&self) -> Vec<&'static str> {
        [
            self.inner.alerts.as_ref().map(Poller::name),
            self.inner.hosts.as_ref().map(Poller::name),
            self.inner.reports.as_ref().map(Poller::name),
            self.inner.backup_jobs.as_ref().map(Poller::name),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start every configured poller.
    pub fn start_all(&self) {
        if let Some(p) = &self.inner.alerts {
            p.start();
        }
        if let Some(p) = &self.inner.hosts {
            p.start();
        }
        if let Some(p) = &self.inner.reports {
            p.start();
        }
        if let Some(p) = &self.inner.backup_jobs {
            p.start();
        }
        info!(domains = ?self.domains(), "dashboard started");
    }

    /// Stop every poller.
    pub fn shutdown(&self) {
        self.inner.stop_all();
    }

    /// Blocking refresh of every configured domain, concurrently.
    pub async fn refresh_all(&self) {
        tokio::join!(
            async {
                if let Some(p) = &self.inner.alerts {
                    p.refresh().await;
                }
            },
            async {
                if let Some(p) = &self.inner.hosts {
                    p.refresh().await;
                }
            },
            async {
                if let Some(p) = &self.inner.reports {
                    p.refresh().await;
                }
            },
            async {
                if let Some(p) = &self.inner.backup_jobs {
                    p.refresh().await;
                }
            },
        );
    }

    // ── One-shot ─────────────────────────────────────────────────────

    /// Fetch both identity-provider event feeds and merge them.
    ///
    /// Not polled: either request failing fails the whole call.
    pub async fn system_logs(&self) -> Result<Vec<SystemLogEntry>, CoreError> {
        let (Some(user), Some(admin)) = (&self.inner.user_events, &self.inner.admin_events) else {
            return Err(CoreError::NotConfigured {
                domain: "system_logs".into(),
            });
        };
        let client = &self.inner.client;
        let (users, admins) =
            tokio::try_join!(client.fetch_records(user), client.fetch_records(admin))?;
        Ok(aggregate_system_logs(users, admins))
    }
}

impl DashboardInner {
    fn stop_all(&self) {
        if let Some(p) = &self.alerts {
            p.stop();
        }
        if let Some(p) = &self.hosts {
            p.stop();
        }
        if let Some(p) = &self.reports {
            p.stop();
        }
        if let Some(p) = &self.backup_jobs {
            p.stop();
        }
    }
}

// Poll tasks hold their own poller handles, so the last dashboard handle
// going away has to cancel them explicitly.
impl Drop for DashboardInner {
    fn drop(&mut self) {
        self.stop_all();
    }
}

fn configured<'a, T>(poller: Option<&'a T>, domain: &str) -> Result<&'a T, CoreError> {
    poller.ok_or_else(|| CoreError::NotConfigured {
        domain: domain.to_owned(),
    })
}
