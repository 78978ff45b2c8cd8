//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Identified;

/// User entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub email: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Identity provider for OIDC users, empty for local users
    pub provider: String,
    pub provider_id: String,
    pub profile_pic_url: String,
}

impl Identified for User {
    fn id(&self) -> &str {
        &self.id
    }
}

/// `GET /user` response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiUsers {
    pub users: Vec<User>,
}
