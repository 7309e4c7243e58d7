//! Async client for the webhooks that feed the vigil dashboard.
//!
//! One [`WebhookClient`] performs one authenticated HTTP call per
//! [`Endpoint`] and returns the parsed JSON body. The raw, partially
//! reliable record shapes of each upstream source live in [`models`].

pub mod auth;
pub mod client;
mod de;
pub mod endpoint;
pub mod error;
pub mod models;
pub mod transport;

pub use auth::{NoAuth, StaticToken, TokenProvider};
pub use client::{WebhookClient, coerce_records};
pub use endpoint::{Endpoint, HttpMethod, RequestBody};
pub use error::Error;
pub use models::RawRecord;
pub use transport::{TlsMode, TransportConfig};
