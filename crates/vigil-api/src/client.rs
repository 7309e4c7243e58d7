// Webhook HTTP client
//
// Wraps `reqwest::Client` with bearer-token injection, status mapping and
// payload coercion. One call in, one parsed JSON body out; retries and
// scheduling belong to the poller in `vigil-core`.

use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::debug;

use crate::auth::TokenProvider;
use crate::endpoint::{Endpoint, HttpMethod};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Async client shared by every dashboard domain.
///
/// Cheap to clone: the underlying `reqwest::Client` and the token provider
/// are both reference counted.
#[derive(Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
}

impl WebhookClient {
    /// Build a client from a transport config and a token provider.
    pub fn new(transport: &TransportConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            tokens,
        })
    }

    /// Wrap a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, tokens: Arc<dyn TokenProvider>) -> Self {
        Self { http, tokens }
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Perform one request and return the parsed JSON body.
    pub async fn fetch_json(&self, endpoint: &Endpoint) -> Result<Value, Error> {
        let resp = self.send(endpoint).await?;
        Self::handle_response(resp).await
    }

    /// Perform one request and coerce the body into a list of raw records.
    ///
    /// An array yields its elements; any other JSON value is treated as a
    /// single record.
    pub async fn fetch_records(&self, endpoint: &Endpoint) -> Result<Vec<Value>, Error> {
        self.fetch_json(endpoint).await.map(coerce_records)
    }

    async fn send(&self, endpoint: &Endpoint) -> Result<reqwest::Response, Error> {
        let mut req = match endpoint.method {
            HttpMethod::Get => {
                debug!("GET {}", endpoint.url);
                self.http.get(endpoint.url.clone())
            }
            HttpMethod::Post => {
                debug!("POST {}", endpoint.url);
                self.http.post(endpoint.url.clone())
            }
        };

        if let Some(body) = endpoint.body.to_json() {
            req = req.json(&body);
        }

        if let Some(token) = self.tokens.bearer_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::InvalidToken(e.to_string()))?;
            value.set_sensitive(true);
            req = req.header(AUTHORIZATION, value);
        }

        Ok(req.send().await?)
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response(resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }

        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message: if raw.trim().is_empty() {
                    status
                        .canonical_reason()
                        .map_or_else(|| status.to_string(), str::to_owned)
                } else {
                    raw
                },
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }
}

/// Coerce a webhook body into a list of records.
pub fn coerce_records(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}
