//! Mock services for testing
//!
//! Provides a recording [`Transport`] so service behaviour can be tested
//! without a Headscale server.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{json, Value};

use headscale_admin::services::{AppStore, HeadscaleService, RequestOptions, Transport};
use headscale_admin::{ApiError, ApiResult};

/// Types of errors the mock can simulate
#[derive(Debug, Clone)]
pub enum MockError {
    /// Connection refused
    ConnectionRefused,
    /// Timeout
    Timeout,
    /// Internal server error
    InternalError(String),
    /// Not found
    NotFound,
}

impl From<MockError> for ApiError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::ConnectionRefused => {
                ApiError::Transport("Failed to connect to Headscale".to_string())
            }
            MockError::Timeout => ApiError::Transport("Headscale request timed out".to_string()),
            MockError::InternalError(msg) => ApiError::Status {
                status: 500,
                body: msg,
            },
            MockError::NotFound => ApiError::Status {
                status: 404,
                body: "not found".to_string(),
            },
        }
    }
}

/// A request seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
    pub opts: RequestOptions,
}

type Route = (String, String);

/// Mock Headscale transport
#[derive(Default)]
pub struct MockTransport {
    responses: RwLock<HashMap<Route, Value>>,
    failures: RwLock<HashMap<Route, MockError>>,
    /// Fail every request when set
    pub error_mode: RwLock<Option<MockError>>,
    calls: RwLock<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` with `body`
    pub fn respond(&self, method: &str, path: &str, body: Value) {
        self.responses
            .write()
            .unwrap()
            .insert((method.to_string(), path.to_string()), body);
    }

    /// Fail `method path` with `error`
    pub fn fail(&self, method: &str, path: &str, error: MockError) {
        self.failures
            .write()
            .unwrap()
            .insert((method.to_string(), path.to_string()), error);
    }

    /// Set error mode to simulate failures
    pub fn set_error_mode(&self, error: MockError) {
        *self.error_mode.write().unwrap() = Some(error);
    }

    /// Clear error mode
    pub fn clear_error_mode(&self) {
        *self.error_mode.write().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    fn handle(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        opts: &RequestOptions,
    ) -> ApiResult<Value> {
        self.calls.write().unwrap().push(RecordedCall {
            method: method.to_string(),
            path: path.to_string(),
            body,
            opts: opts.clone(),
        });

        if let Some(ref error) = *self.error_mode.read().unwrap() {
            return Err(error.clone().into());
        }

        let route = (method.to_string(), path.to_string());
        if let Some(error) = self.failures.read().unwrap().get(&route) {
            return Err(error.clone().into());
        }

        Ok(self
            .responses
            .read()
            .unwrap()
            .get(&route)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str, opts: &RequestOptions) -> ApiResult<Value> {
        self.handle("GET", path, None, opts)
    }

    async fn post(&self, path: &str, body: Value, opts: &RequestOptions) -> ApiResult<Value> {
        self.handle("POST", path, Some(body), opts)
    }

    async fn put(&self, path: &str, body: Value, opts: &RequestOptions) -> ApiResult<Value> {
        self.handle("PUT", path, Some(body), opts)
    }

    async fn delete(&self, path: &str, opts: &RequestOptions) -> ApiResult<Value> {
        self.handle("DELETE", path, None, opts)
    }
}

/// Service over a fresh mock transport and empty store
pub fn mock_service() -> (HeadscaleService, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new());
    let service = HeadscaleService::new(transport.clone(), Arc::new(AppStore::new()));
    (service, transport)
}
