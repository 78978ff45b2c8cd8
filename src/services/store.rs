//! Application state store
//!
//! Holds the users, nodes and pre-auth keys currently known to the
//! application. Collections are snapshots of what the server last returned;
//! mutators prune entries by identifier after a confirmed delete. Every write
//! hands back the new snapshot so callers never need a second read.

use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{Identified, Node, PreAuthKey, User};

/// Point-in-time copy of every collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub users: Vec<User>,
    pub nodes: Vec<Node>,
    pub pre_auth_keys: Vec<PreAuthKey>,
}

/// Shared state owner, usually held as `Arc<AppStore>`
#[derive(Debug, Default)]
pub struct AppStore {
    state: RwLock<StoreSnapshot>,
}

/// Drop every entry whose identifier equals `id`, leaving the rest in order
fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: &str) -> usize {
    let before = items.len();
    items.retain(|item| item.id() != id);
    before - items.len()
}

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with a snapshot
    pub fn with_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.clone()
    }

    pub async fn users(&self) -> Vec<User> {
        self.state.read().await.users.clone()
    }

    pub async fn nodes(&self) -> Vec<Node> {
        self.state.read().await.nodes.clone()
    }

    pub async fn pre_auth_keys(&self) -> Vec<PreAuthKey> {
        self.state.read().await.pre_auth_keys.clone()
    }

    /// Look up a user by identifier
    pub async fn user(&self, id: &str) -> Option<User> {
        self.state
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
    }

    /// Look up a node by identifier
    pub async fn node(&self, id: &str) -> Option<Node> {
        self.state
            .read()
            .await
            .nodes
            .iter()
            .find(|n| n.id == id)
            .cloned()
    }

    /// Look up a pre-auth key by identifier
    pub async fn pre_auth_key(&self, id: &str) -> Option<PreAuthKey> {
        self.state
            .read()
            .await
            .pre_auth_keys
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub async fn set_users(&self, users: Vec<User>) -> Vec<User> {
        let mut state = self.state.write().await;
        state.users = users;
        state.users.clone()
    }

    pub async fn set_nodes(&self, nodes: Vec<Node>) -> Vec<Node> {
        let mut state = self.state.write().await;
        state.nodes = nodes;
        state.nodes.clone()
    }

    pub async fn set_pre_auth_keys(&self, pre_auth_keys: Vec<PreAuthKey>) -> Vec<PreAuthKey> {
        let mut state = self.state.write().await;
        state.pre_auth_keys = pre_auth_keys;
        state.pre_auth_keys.clone()
    }

    /// Replace all collections at once
    pub async fn replace_all(&self, snapshot: StoreSnapshot) -> StoreSnapshot {
        let mut state = self.state.write().await;
        *state = snapshot;
        state.clone()
    }

    pub async fn remove_user(&self, id: &str) -> Vec<User> {
        let mut state = self.state.write().await;
        let removed = remove_by_id(&mut state.users, id);
        debug!(id = id, removed = removed, "Pruned user from store");
        state.users.clone()
    }

    pub async fn remove_node(&self, id: &str) -> Vec<Node> {
        let mut state = self.state.write().await;
        let removed = remove_by_id(&mut state.nodes, id);
        debug!(id = id, removed = removed, "Pruned node from store");
        state.nodes.clone()
    }

    pub async fn remove_pre_auth_key(&self, id: &str) -> Vec<PreAuthKey> {
        let mut state = self.state.write().await;
        let removed = remove_by_id(&mut state.pre_auth_keys, id);
        debug!(id = id, removed = removed, "Pruned pre-auth key from store");
        state.pre_auth_keys.clone()
    }
}
