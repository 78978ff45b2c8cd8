//! Headscale REST client
//!
//! reqwest-backed [`Transport`] for the Headscale `/api/v1` surface. Handles
//! base URL composition, bearer authentication and mapping of non-2xx
//! responses to [`ApiError::Status`].

use std::error::Error as StdError;
use std::fs;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Certificate, Client, Method, RequestBuilder};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::transport::{RequestOptions, Transport};
use crate::config::HeadscaleConfig;
use crate::utils::error::{truncate_body, ApiError, ApiResult};

/// Path of the REST API below the server URL
const API_ROOT: &str = "/api/v1";

/// Read a PEM bundle, logging why it could not be used
fn read_ca_bundle(path: &Path) -> ApiResult<Vec<u8>> {
    if !path.exists() {
        let msg = format!("CA bundle does not exist: {}", path.display());
        error!("Headscale SSL ERROR: {}", msg);
        return Err(ApiError::Config(msg));
    }

    match fs::read(path) {
        Ok(contents) => {
            info!(
                "Headscale SSL: CA bundle loaded successfully ({} bytes): {}",
                contents.len(),
                path.display()
            );
            Ok(contents)
        }
        Err(e) => {
            let msg = format!(
                "CA bundle exists but cannot be read (permission denied?): {} - {}",
                path.display(),
                e
            );
            error!("Headscale SSL ERROR: {}", msg);
            Err(ApiError::Config(msg))
        }
    }
}

/// Headscale API client
#[derive(Clone)]
pub struct HeadscaleClient {
    client: Client,
    base_url: String,
}

impl HeadscaleClient {
    /// Create a new client with optional custom CA configuration
    pub fn new(config: &HeadscaleConfig) -> ApiResult<Self> {
        info!("Initializing Headscale client for {}", config.url);

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|e| ApiError::Config(format!("Invalid API key: {}", e)))?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers);

        if let Some(ref ca_path) = config.ssl_ca {
            let bundle = read_ca_bundle(ca_path)?;
            let certs = Certificate::from_pem_bundle(&bundle).map_err(|e| {
                ApiError::Config(format!("Failed to parse CA certificate(s) as PEM: {}", e))
            })?;

            info!(
                "Headscale SSL: Parsed {} certificate(s) from CA bundle",
                certs.len()
            );

            for cert in certs {
                builder = builder.add_root_certificate(cert);
            }
        }

        if !config.ssl_verify {
            warn!("SSL certificate verification is DISABLED - this is insecure!");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: format!("{}{}", config.url.trim_end_matches('/'), API_ROOT),
        })
    }

    /// Root URL every API path is appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, opts: &RequestOptions) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);

        if let Some(timeout) = opts.timeout {
            request = request.timeout(timeout);
        }
        for (name, value) in &opts.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        request
    }

    /// Send a request and decode the JSON body; an empty body decodes to `Null`
    async fn send(&self, method: Method, path: &str, request: RequestBuilder) -> ApiResult<Value> {
        debug!("Headscale: Sending {} request to {}", method, path);

        let response = request.send().await.map_err(|e| {
            error!(
                "Headscale ERROR: HTTP {} request failed to {}: {}",
                method, path, e
            );
            error!(
                "Headscale ERROR: Error flags - is_connect: {}, is_timeout: {}, is_request: {}",
                e.is_connect(),
                e.is_timeout(),
                e.is_request()
            );

            if let Some(source) = e.source() {
                error!("Headscale ERROR: Underlying cause: {}", source);
                let mut current: &dyn StdError = source;
                while let Some(next) = current.source() {
                    error!("Headscale ERROR: Caused by: {}", next);
                    current = next;
                }
            }

            ApiError::from(e)
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            debug!("Headscale: {} {} returned {}", method, path, status);
            return Err(ApiError::from_status(status.as_u16(), body));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            ApiError::Decode(format!(
                "Failed to parse response JSON: {}: {}",
                e,
                truncate_body(&body)
            ))
        })
    }
}

#[async_trait]
impl Transport for HeadscaleClient {
    async fn get(&self, path: &str, opts: &RequestOptions) -> ApiResult<Value> {
        let request = self.request(Method::GET, path, opts);
        self.send(Method::GET, path, request).await
    }

    async fn post(&self, path: &str, body: Value, opts: &RequestOptions) -> ApiResult<Value> {
        let request = self.request(Method::POST, path, opts).json(&body);
        self.send(Method::POST, path, request).await
    }

    async fn put(&self, path: &str, body: Value, opts: &RequestOptions) -> ApiResult<Value> {
        let request = self.request(Method::PUT, path, opts).json(&body);
        self.send(Method::PUT, path, request).await
    }

    async fn delete(&self, path: &str, opts: &RequestOptions) -> ApiResult<Value> {
        let request = self.request(Method::DELETE, path, opts);
        self.send(Method::DELETE, path, request).await
    }
}
