// ── Core error types ──
//
// User-facing errors from vigil-core. Consumers never see reqwest errors
// or JSON parse failures directly; `From<vigil_api::Error>` translates
// transport-layer failures into dashboard-level variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Fetch errors ─────────────────────────────────────────────────
    #[error("Cannot reach webhook: {reason}")]
    Unreachable { reason: String },

    #[error("Webhook rejected the access token")]
    Unauthorized,

    #[error("Webhook returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Webhook returned malformed data: {message}")]
    MalformedPayload { message: String },

    #[error("Request superseded by a newer refresh")]
    Superseded,

    // ── Setup errors ─────────────────────────────────────────────────
    #[error("Domain '{domain}' is not configured")]
    NotConfigured { domain: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP status code, if the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<vigil_api::Error> for CoreError {
    fn from(err: vigil_api::Error) -> Self {
        match err {
            vigil_api::Error::Network(e) => CoreError::Unreachable {
                reason: e.to_string(),
            },
            vigil_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            vigil_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS setup failed: {msg}"),
            },
            vigil_api::Error::InvalidToken(msg) => CoreError::Config {
                message: format!("unusable access token: {msg}"),
            },
            vigil_api::Error::Unauthorized => CoreError::Unauthorized,
            vigil_api::Error::Http { status, message } => CoreError::Http { status, message },
            vigil_api::Error::Deserialization { message, .. } => {
                CoreError::MalformedPayload { message }
            }
        }
    }
}

/// Why one raw record could not be normalized.
///
/// Never surfaced to consumers: the record is dropped and the rest of the
/// snapshot proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("{domain} record is not a JSON object")]
    NotAnObject { domain: &'static str },

    #[error("{domain} record is missing required field `{field}`")]
    MissingField {
        domain: &'static str,
        field: &'static str,
    },
}

/// Failure reading or writing the on-disk snapshot cache.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry is not valid JSON: {0}")]
    Encoding(#[from] serde_json::Error),
}
