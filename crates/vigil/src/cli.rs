//! Clap derive structures for the `vigil` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use vigil_core::{AlertStatus, HostStatus, JobStatus, LogSeverity, Severity};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vigil -- monitoring dashboard in the terminal
#[derive(Debug, Parser)]
#[command(
    name = "vigil",
    version,
    about = "Watch alerts, hosts, reports and backup jobs from the command line",
    long_about = "Polls the monitoring webhooks (AI-annotated alerts, Zabbix hosts,\n\
        AI reports, Veeam backup jobs) and renders normalized, sorted views.\n\n\
        List commands fetch once; add --watch to keep polling.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Webhook profile to use
    #[arg(long, short = 'p', env = "VIGIL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "VIGIL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Webhook base URL (overrides profile)
    #[arg(long, short = 'u', env = "VIGIL_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Bearer token (overrides the profile's token chain)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "VIGIL_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (0 = none)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Do not read or write the host snapshot cache
    #[arg(long, global = true)]
    pub no_cache: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one identifier per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// AI-annotated monitoring alerts
    #[command(alias = "a")]
    Alerts(AlertsArgs),

    /// Monitored hosts
    #[command(alias = "h")]
    Hosts(HostsArgs),

    /// AI-generated reports
    #[command(alias = "r")]
    Reports(ReportsArgs),

    /// Backup jobs
    #[command(alias = "j", alias = "backups")]
    Jobs(JobsArgs),

    /// Identity-provider user and admin events
    Logs(LogsArgs),

    /// Counts and connection state for every domain
    Summary,

    /// Manage configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared List Arguments ────────────────────────────────────────────

/// Search, paging and watch flags shared by every list command.
#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Case-insensitive text search
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Items per page (0 = everything)
    #[arg(long, default_value = "0")]
    pub page_size: usize,

    /// Keep polling and re-render on every change
    #[arg(long, short = 'w')]
    pub watch: bool,
}

// ── Domains ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// Minimum severity (info, warning, average, high, disaster)
    #[arg(long)]
    pub severity: Option<Severity>,

    /// Status (active, acknowledged, resolved)
    #[arg(long, conflicts_with = "open")]
    pub status: Option<AlertStatus>,

    /// Only alerts that are not resolved
    #[arg(long)]
    pub open: bool,
}

#[derive(Debug, Args)]
pub struct HostsArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// Status (online, offline, unknown, disabled)
    #[arg(long, conflicts_with = "problems")]
    pub status: Option<HostStatus>,

    /// Only hosts with open problems
    #[arg(long)]
    pub problems: bool,
}

#[derive(Debug, Args)]
pub struct ReportsArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// Report type (daily, weekly, ...)
    #[arg(long)]
    pub kind: Option<String>,
}

#[derive(Debug, Args)]
pub struct JobsArgs {
    #[command(flatten)]
    pub list: ListArgs,

    /// Status (success, warning, failed, running, idle, disabled, unknown)
    #[arg(long)]
    pub status: Option<JobStatus>,
}

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Case-insensitive text search
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Items per page (0 = everything)
    #[arg(long, default_value = "0")]
    pub page_size: usize,

    /// Minimum severity (info, warning, error)
    #[arg(long)]
    pub severity: Option<LogSeverity>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the loaded configuration (secrets masked)
    Show,

    /// Write a starter config with one profile
    Init {
        /// Webhook base URL for the default profile
        base_url: String,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// List configured profiles
    Profiles,

    /// Store a bearer token in the system keyring (read from stdin)
    SetToken,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
