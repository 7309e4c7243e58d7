// Endpoint descriptors: where a domain's payload comes from and how to ask.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Value, json};
use url::Url;

/// HTTP verb used by a webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

/// JSON body sent with a request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestBody {
    /// No body at all.
    #[default]
    None,
    /// A literal `{}`; some webhooks refuse a POST without a body.
    EmptyObject,
    /// `{"from": "...", "to": "..."}` as ISO-8601 UTC with millisecond precision.
    DateRange {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
}

impl RequestBody {
    /// The JSON value to send, or `None` for bodiless requests.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            Self::None => None,
            Self::EmptyObject => Some(json!({})),
            Self::DateRange { from, to } => Some(json!({
                "from": from.to_rfc3339_opts(SecondsFormat::Millis, true),
                "to": to.to_rfc3339_opts(SecondsFormat::Millis, true),
            })),
        }
    }
}

/// One webhook call: URL, verb, and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: Url,
    pub method: HttpMethod,
    pub body: RequestBody,
}

impl Endpoint {
    pub fn get(url: Url) -> Self {
        Self {
            url,
            method: HttpMethod::Get,
            body: RequestBody::None,
        }
    }

    pub fn post(url: Url, body: RequestBody) -> Self {
        Self {
            url,
            method: HttpMethod::Post,
            body,
        }
    }

    /// Same endpoint with a different body (used for per-cycle date ranges).
    pub fn with_body(&self, body: RequestBody) -> Self {
        Self {
            url: self.url.clone(),
            method: self.method,
            body,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn date_range_serializes_like_iso_strings() {
        let from = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2025, 1, 8, 12, 30, 0).unwrap();
        let body = RequestBody::DateRange { from, to }.to_json().unwrap();

        assert_eq!(body["from"], "2025-01-01T00:00:00.000Z");
        assert_eq!(body["to"], "2025-01-08T12:30:00.000Z");
    }

    #[test]
    fn empty_object_and_none_bodies() {
        assert_eq!(RequestBody::EmptyObject.to_json(), Some(json!({})));
        assert_eq!(RequestBody::None.to_json(), None);
    }
}
