//! Policy document model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `GET /policy` response envelope; the policy text is opaque to the client
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPolicy {
    pub policy: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// `PUT /policy` request body
#[derive(Debug, Clone, Serialize)]
pub struct SetPolicyRequest {
    pub policy: String,
}
