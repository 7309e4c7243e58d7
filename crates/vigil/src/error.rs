//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and process exit codes.

use miette::Diagnostic;
use thiserror::Error;

use vigil_config::ConfigError;
use vigil_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach webhook: {reason}")]
    #[diagnostic(
        code(vigil::unreachable),
        help(
            "Check that the webhook host is running and reachable.\n\
             Try: vigil -vv summary"
        )
    )]
    Unreachable { reason: String },

    #[error("Webhook returned HTTP {status}: {message}")]
    #[diagnostic(code(vigil::http))]
    Http { status: u16, message: String },

    #[error("Webhook returned a malformed payload: {message}")]
    #[diagnostic(
        code(vigil::malformed),
        help("Inspect the raw response with: vigil -vvv <command>")
    )]
    Malformed { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Webhook rejected the bearer token")]
    #[diagnostic(
        code(vigil::auth_failed),
        help(
            "Set a token for profile '{profile}' with: vigil config set-token\n\
             Or export the variable named by the profile's token_env."
        )
    )]
    AuthFailed { profile: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(vigil::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: vigil config init <BASE_URL>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No webhook configured")]
    #[diagnostic(
        code(vigil::no_config),
        help(
            "Create a config with: vigil config init <BASE_URL>\n\
             Or pass --base-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Domain '{domain}' is not configured for this profile")]
    #[diagnostic(
        code(vigil::not_configured),
        help("Set a webhook path for '{domain}' in the profile.")
    )]
    NotConfigured { domain: String },

    #[error("Config file already exists at {path}")]
    #[diagnostic(code(vigil::config_exists), help("Pass --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(vigil::config))]
    Config(ConfigError),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vigil::validation))]
    Validation { field: String, reason: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(vigil::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } | Self::Http { .. } | Self::Malformed { .. } => {
                exit_code::CONNECTION
            }
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::ProfileNotFound { .. } | Self::NotConfigured { .. } => exit_code::NOT_FOUND,
            Self::NoConfig { .. }
            | Self::ConfigExists { .. }
            | Self::Config(_)
            | Self::Validation { .. } => exit_code::USAGE,
            Self::Internal(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Unreachable { reason } => Self::Unreachable { reason },
            CoreError::Unauthorized => Self::AuthFailed {
                profile: "current".into(),
            },
            CoreError::Http { status, message } => Self::Http { status, message },
            CoreError::MalformedPayload { message } => Self::Malformed { message },
            CoreError::NotConfigured { domain } => Self::NotConfigured { domain },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Superseded => {
                Self::Internal("request was superseded by a newer one".into())
            }
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name, available } => {
                Self::ProfileNotFound { name, available }
            }
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}
