//! Transport seam between the entity operations and the HTTP layer
//!
//! Accessors and mutators only ever talk to a [`Transport`]; the production
//! implementation is [`HeadscaleClient`](super::headscale::HeadscaleClient).

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::utils::error::{ApiError, ApiResult};

/// API paths, relative to the `/api/v1` root
pub const API_URL_USER: &str = "/user";
pub const API_URL_NODE: &str = "/node";
pub const API_URL_PREAUTHKEY: &str = "/preauthkey";
pub const API_URL_APIKEY: &str = "/apikey";
pub const API_URL_POLICY: &str = "/policy";

/// Per-request override forwarded verbatim to the transport
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Replaces the client-wide timeout for this request
    pub timeout: Option<Duration>,
    /// Extra headers added to this request
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Performs one HTTP exchange against the API and returns the decoded JSON body
///
/// Implementations fail with [`ApiError::Status`] on non-2xx responses and
/// with [`ApiError::Transport`] when no response was received.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, opts: &RequestOptions) -> ApiResult<Value>;

    async fn post(&self, path: &str, body: Value, opts: &RequestOptions) -> ApiResult<Value>;

    async fn put(&self, path: &str, body: Value, opts: &RequestOptions) -> ApiResult<Value>;

    async fn delete(&self, path: &str, opts: &RequestOptions) -> ApiResult<Value>;
}

/// Decode a response envelope into its typed form
pub fn decode<T: DeserializeOwned>(path: &str, value: Value) -> ApiResult<T> {
    serde_json::from_value(value)
        .map_err(|e| ApiError::Decode(format!("Unexpected response from {}: {}", path, e)))
}

/// Append a single `key=value` query parameter, URL-encoding the value
pub fn with_query(path: &str, key: &str, value: &str) -> String {
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", path, sep, key, urlencoding::encode(value))
}
