//! Shared configuration for the vigil CLI.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `vigil_core::DashboardConfig`. Core never reads config
//! files; it receives a pre-built `DashboardConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use vigil_api::{Endpoint, RequestBody, TlsMode};
use vigil_core::{DashboardConfig, DomainEndpoint, PollSettings, config as core_config};

/// Keyring service name; entries are keyed `<profile>/token`.
pub const KEYRING_SERVICE: &str = "vigil";

pub const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    ProfileNotFound { name: String, available: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named webhook profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// A config with a single default profile pointing at `base_url`.
    pub fn starter(base_url: impl Into<String>) -> Self {
        let mut cfg = Self::default();
        cfg.profiles
            .insert(DEFAULT_PROFILE.into(), Profile::new(base_url));
        cfg
    }

    /// The requested profile name, else the configured default.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| DEFAULT_PROFILE.into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.into(),
                available: self.profile_names(),
            })
    }

    /// Comma-separated profile names, or `(none)`.
    pub fn profile_names(&self) -> String {
        if self.profiles.is_empty() {
            "(none)".into()
        } else {
            self.profiles
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds; 0 means no timeout.
    #[serde(default)]
    pub timeout: u64,

    /// Trailing window for the reports request.
    #[serde(default = "default_report_days")]
    pub report_days: u32,

    /// Persist the host snapshot between runs.
    #[serde(default = "default_true")]
    pub cache: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: 0,
            report_days: default_report_days(),
            cache: true,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_report_days() -> u32 {
    core_config::REPORT_WINDOW_DAYS
}
fn default_true() -> bool {
    true
}

/// A named set of webhooks.
///
/// Each webhook field is a path relative to `base_url` or an absolute URL.
/// An empty string leaves that domain unconfigured.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Base URL the webhook paths are joined onto
    /// (e.g., "https://n8n.example.com/webhook/").
    pub base_url: Option<String>,

    #[serde(default = "default_alerts_path")]
    pub alerts: String,

    #[serde(default = "default_hosts_path")]
    pub hosts: String,

    #[serde(default = "default_reports_path")]
    pub reports: String,

    #[serde(default = "default_backup_jobs_path")]
    pub backup_jobs: String,

    #[serde(default = "default_user_events_path")]
    pub user_events: String,

    #[serde(default = "default_admin_events_path")]
    pub admin_events: String,

    /// Bearer token (plaintext, prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds, 0 = none).
    pub timeout: Option<u64>,

    /// Override the reports window.
    pub report_days: Option<u32>,

    /// Override host snapshot caching.
    pub cache: Option<bool>,

    /// Per-domain polling intervals as humantime strings ("30s", "2m").
    #[serde(default)]
    pub intervals: Intervals,
}

impl Profile {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            alerts: default_alerts_path(),
            hosts: default_hosts_path(),
            reports: default_reports_path(),
            backup_jobs: default_backup_jobs_path(),
            user_events: default_user_events_path(),
            admin_events: default_admin_events_path(),
            token: None,
            token_env: Some("VIGIL_TOKEN".into()),
            ca_cert: None,
            insecure: None,
            timeout: None,
            report_days: None,
            cache: None,
            intervals: Intervals::default(),
        }
    }
}

fn default_alerts_path() -> String {
    "ai-insights".into()
}
fn default_hosts_path() -> String {
    "zabbix-hosts".into()
}
fn default_reports_path() -> String {
    "ai-reports".into()
}
fn default_backup_jobs_path() -> String {
    "veeam-jobs".into()
}
fn default_user_events_path() -> String {
    "admin/events".into()
}
fn default_admin_events_path() -> String {
    "admin/admin-events".into()
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Intervals {
    pub alerts: Option<String>,
    pub hosts: Option<String>,
    pub reports: Option<String>,
    pub backup_jobs: Option<String>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "vigil", "vigil")
}

fn home_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("vigil");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Platform cache directory for persisted snapshots.
pub fn cache_dir() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(".cache"),
        |dirs| dirs.cache_dir().to_path_buf(),
    )
}

// ── Loading & saving ────────────────────────────────────────────────

/// Load the full Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then the TOML file at `path` (if present), then `VIGIL_*`
/// environment variables (`__` separates nested keys, e.g.
/// `VIGIL_DEFAULTS__TIMEOUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("VIGIL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|e| {
        debug!(error = %e, "falling back to default config");
        Config::default()
    })
}

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the bearer token: `token_env` variable → system keyring →
/// plaintext `token`. `None` means requests go out unauthenticated.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            if !val.is_empty() {
                return Some(SecretString::from(val));
            }
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token")) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    profile.token.clone().map(SecretString::from)
}

/// Store a token for `profile_name` in the system keyring.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    let keyring_err = |e: keyring::Error| ConfigError::Validation {
        field: "keyring".into(),
        reason: e.to_string(),
    };
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/token"))
        .and_then(|entry| entry.set_password(token))
        .map_err(keyring_err)
}

// ── Translation to DashboardConfig ──────────────────────────────────

/// Build a `DashboardConfig` for a named profile, resolving its token and
/// the platform cache directory.
pub fn profile_to_dashboard_config(
    cfg: &Config,
    profile_name: &str,
) -> Result<DashboardConfig, ConfigError> {
    let profile = cfg.profile(profile_name)?;
    let token = resolve_token(profile, profile_name);
    build_dashboard_config(profile, &cfg.defaults, token, Some(cache_dir()))
}

/// Translate a profile into a `DashboardConfig` with an already-resolved
/// token. `cache_dir` is used only when caching is enabled.
pub fn build_dashboard_config(
    profile: &Profile,
    defaults: &Defaults,
    token: Option<SecretString>,
    cache_dir: Option<PathBuf>,
) -> Result<DashboardConfig, ConfigError> {
    let base = profile
        .base_url
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_base_url)
        .transpose()?;
    let base = base.as_ref();

    let alerts_interval = interval(
        profile.intervals.alerts.as_deref(),
        "intervals.alerts",
        core_config::ALERTS_INTERVAL,
    )?;
    let hosts_interval = interval(
        profile.intervals.hosts.as_deref(),
        "intervals.hosts",
        core_config::HOSTS_INTERVAL,
    )?;
    let reports_interval = interval(
        profile.intervals.reports.as_deref(),
        "intervals.reports",
        core_config::REPORTS_INTERVAL,
    )?;
    let backup_jobs_interval = interval(
        profile.intervals.backup_jobs.as_deref(),
        "intervals.backup_jobs",
        core_config::BACKUP_JOBS_INTERVAL,
    )?;

    let alerts = webhook_url(base, &profile.alerts, "alerts")?.map(|url| DomainEndpoint {
        endpoint: Endpoint::post(url, RequestBody::EmptyObject),
        poll: PollSettings::every(alerts_interval),
    });
    let hosts = webhook_url(base, &profile.hosts, "hosts")?.map(|url| DomainEndpoint {
        endpoint: Endpoint::get(url),
        poll: PollSettings::every(hosts_interval),
    });
    let reports = webhook_url(base, &profile.reports, "reports")?.map(|url| DomainEndpoint {
        endpoint: Endpoint::post(url, RequestBody::EmptyObject),
        poll: PollSettings::every(reports_interval),
    });
    let backup_jobs =
        webhook_url(base, &profile.backup_jobs, "backup_jobs")?.map(|url| DomainEndpoint {
            endpoint: Endpoint::get(url),
            poll: PollSettings::every(backup_jobs_interval).abortable(),
        });

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let timeout = match profile.timeout.unwrap_or(defaults.timeout) {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    let cache_dir = cache_dir.filter(|_| profile.cache.unwrap_or(defaults.cache));

    Ok(DashboardConfig {
        alerts,
        hosts,
        reports,
        backup_jobs,
        user_events: webhook_url(base, &profile.user_events, "user_events")?,
        admin_events: webhook_url(base, &profile.admin_events, "admin_events")?,
        token,
        tls,
        timeout,
        report_window_days: profile.report_days.unwrap_or(defaults.report_days),
        cache_dir,
    })
}

/// Parse the base URL, forcing a trailing slash so paths join beneath it.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url: Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Resolve one webhook field: empty → `None`, absolute URL as-is,
/// anything else joined onto the base URL.
fn webhook_url(base: Option<&Url>, value: &str, field: &str) -> Result<Option<Url>, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }

    match Url::parse(value) {
        Ok(url) => Ok(Some(url)),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.ok_or_else(|| ConfigError::Validation {
                field: field.into(),
                reason: format!("'{value}' is a relative path but base_url is not set"),
            })?;
            base.join(value.trim_start_matches('/'))
                .map(Some)
                .map_err(|e| ConfigError::Validation {
                    field: field.into(),
                    reason: e.to_string(),
                })
        }
        Err(e) => Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("invalid URL '{value}': {e}"),
        }),
    }
}

fn interval(raw: Option<&str>, field: &str, fallback: Duration) -> Result<Duration, ConfigError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(fallback),
        Some(text) => humantime::parse_duration(text).map_err(|e| ConfigError::Validation {
            field: field.into(),
            reason: format!("'{text}': {e}"),
        }),
    }
}
