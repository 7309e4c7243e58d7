// ── Raw payload fetching ──
//
// The poller asks a `RecordSource` for one raw payload per cycle. The
// production source wraps a `WebhookClient`; tests substitute scripted
// sources.

use std::future::Future;
use std::sync::Arc;

use chrono::TimeDelta;
use serde_json::Value;
use vigil_api::{Endpoint, RequestBody, WebhookClient};

use crate::clock::Clock;

/// Produces one raw payload, already coerced into a list of records.
pub trait RecordSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Vec<Value>, vigil_api::Error>> + Send;
}

/// A webhook endpoint, optionally sent a trailing date range each cycle.
#[derive(Clone)]
pub struct WebhookSource {
    client: WebhookClient,
    endpoint: Endpoint,
    window: Option<(TimeDelta, Arc<dyn Clock>)>,
}

impl WebhookSource {
    pub fn new(client: WebhookClient, endpoint: Endpoint) -> Self {
        Self {
            client,
            endpoint,
            window: None,
        }
    }

    /// Send `{from: now - days, to: now}` with every request.
    #[must_use]
    pub fn with_trailing_days(mut self, days: u32, clock: Arc<dyn Clock>) -> Self {
        self.window = Some((TimeDelta::days(i64::from(days)), clock));
        self
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The endpoint as it will be requested right now.
    pub fn current_endpoint(&self) -> Endpoint {
        match &self.window {
            Some((span, clock)) => {
                let to = clock.now();
                self.endpoint.with_body(RequestBody::DateRange {
                    from: to - *span,
                    to,
                })
            }
            None => self.endpoint.clone(),
        }
    }
}

impl RecordSource for WebhookSource {
    async fn fetch(&self) -> Result<Vec<Value>, vigil_api::Error> {
        let endpoint = self.current_endpoint();
        self.client.fetch_records(&endpoint).await
    }
}
