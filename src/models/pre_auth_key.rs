//! Pre-authentication key model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Identified, User};

/// Secret that lets a node join the tailnet without an interactive login
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreAuthKey {
    pub id: String,
    /// Owning user; absent for keys that only carry tags
    pub user: Option<User>,
    pub key: String,
    pub reusable: bool,
    pub ephemeral: bool,
    pub used: bool,
    pub expiration: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub acl_tags: Vec<String>,
}

impl PreAuthKey {
    /// Identifier of the owning user, if any
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

impl Identified for PreAuthKey {
    fn id(&self) -> &str {
        &self.id
    }
}

/// `GET /preauthkey` response envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPreAuthKeys {
    pub pre_auth_keys: Vec<PreAuthKey>,
}
