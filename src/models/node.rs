//! Node data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Identified, User};

/// Represents a machine registered with Headscale
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Node {
    /// Server-assigned identifier
    pub id: String,

    /// Hostname reported by the client
    pub name: String,

    /// Name assigned by the administrator (used in MagicDNS)
    pub given_name: String,

    /// Owning user
    pub user: Option<User>,

    /// Tailnet addresses (IPv4 and IPv6)
    pub ip_addresses: Vec<String>,

    pub machine_key: String,
    pub node_key: String,
    pub disco_key: String,

    pub last_seen: Option<DateTime<Utc>>,
    pub expiry: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,

    /// How the node joined (`REGISTER_METHOD_AUTH_KEY`, `REGISTER_METHOD_OIDC`, ...)
    pub register_method: String,

    pub online: bool,

    pub tags: Vec<String>,

    /// Subnet routes enabled by an administrator
    pub approved_routes: Vec<String>,

    /// Subnet routes advertised by the node
    pub available_routes: Vec<String>,

    /// Routes currently served by the node
    pub subnet_routes: Vec<String>,
}

impl Node {
    /// Identifier of the owning user, if any
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

impl Identified for Node {
    fn id(&self) -> &str {
        &self.id
    }
}

/// `GET /node` response envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiNodes {
    pub nodes: Vec<Node>,
}
