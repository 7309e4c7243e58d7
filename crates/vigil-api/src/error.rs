use thiserror::Error;

/// Top-level error type for the `vigil-api` crate.
///
/// Covers every way a single webhook call can fail. Nothing here is
/// retried: `vigil-core` catches these at the polling boundary and turns
/// them into connection state.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// Transport-level failure (DNS, connection refused, reset, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The bearer token cannot be used as a header value.
    #[error("Invalid bearer token: {0}")]
    InvalidToken(String),

    // ── HTTP ────────────────────────────────────────────────────────
    /// The webhook rejected the bearer token.
    #[error("unauthorized (HTTP 401)")]
    Unauthorized,

    /// Any other non-2xx response.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// 2xx response whose body is not JSON, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status code, if the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Http { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` for failures where the request never produced a response.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Returns `true` if waiting for the next poll might resolve this error.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}
