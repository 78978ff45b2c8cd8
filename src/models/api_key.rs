//! API key models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// API key as listed by the server; the secret itself is never returned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiKey {
    pub id: String,
    pub prefix: String,
    pub expiration: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

/// `GET /apikey` response envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiApiKeys {
    pub api_keys: Vec<ApiKey>,
}

/// `POST /apikey/expire` request body
#[derive(Debug, Clone, Serialize)]
pub struct ExpireApiKeyRequest {
    pub prefix: String,
}
