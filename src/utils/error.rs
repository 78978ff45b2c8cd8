//! Error types and handling
//!
//! Every fallible operation in the crate returns [`ApiResult`]. Transport
//! failures, non-2xx responses and undecodable bodies are kept apart so that
//! callers can tell failure causes from one another.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Headscale API error types
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, timeout or request construction failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status
    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Caller supplied arguments that cannot form a valid request
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status of the failed request, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server reported the entity as missing
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Build a status error from a response body, preferring the gateway's
    /// `message` field when the body is a structured error
    pub fn from_status(status: u16, body: String) -> Self {
        let body = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(parsed) if !parsed.message.is_empty() => parsed.message,
            _ => body,
        };
        ApiError::Status {
            status,
            body: truncate_body(&body),
        }
    }
}

/// Longest response body kept in an error
pub const MAX_ERROR_BODY: usize = 500;

/// Cut `body` to [`MAX_ERROR_BODY`] bytes on a char boundary
pub fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &body[..end])
}

/// Error body returned by the Headscale gRPC gateway
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct ErrorResponse {
    /// gRPC status code
    #[serde(default)]
    pub code: i32,
    /// Human-readable error message
    #[serde(default)]
    pub message: String,
    /// Additional error details (optional)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<serde_json::Value>,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            ApiError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else if err.is_timeout() {
            ApiError::Transport("Headscale request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Transport("Failed to connect to Headscale".to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(format!("JSON parsing error: {}", err))
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
