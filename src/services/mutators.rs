//! Entity mutators
//!
//! Each delete performs one request and, only once the server has confirmed
//! it, prunes the entity from the store. A failed request leaves the store
//! as it was and hands the error back to the caller.

use tracing::{info, warn};

use super::store::StoreSnapshot;
use super::transport::{
    with_query, RequestOptions, API_URL_APIKEY, API_URL_NODE, API_URL_PREAUTHKEY, API_URL_USER,
};
use super::HeadscaleService;
use crate::models::{ExpireApiKeyRequest, Node, PreAuthKey, User};
use crate::utils::api_key::api_key_prefix;
use crate::utils::error::ApiResult;

/// Result of an API key expiry request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpireOutcome {
    /// The server expired the key with this prefix
    Expired { prefix: String },
    /// No prefix could be derived from the key, nothing was sent
    Skipped,
}

fn path_segment(base: &str, id: &str) -> String {
    format!("{}/{}", base, urlencoding::encode(id))
}

impl HeadscaleService {
    /// Delete a user and drop it from the store
    pub async fn delete_user(&self, user: &User) -> ApiResult<Vec<User>> {
        let path = path_segment(API_URL_USER, &user.id);
        match self.transport.delete(&path, &RequestOptions::default()).await {
            Ok(_) => {
                let users = self.store.remove_user(&user.id).await;
                info!(id = %user.id, "Deleted User \"{}\"", user.name);
                Ok(users)
            }
            Err(e) => {
                warn!(id = %user.id, error = %e, "Failed to delete user");
                Err(e)
            }
        }
    }

    /// Delete a node and drop it from the store
    pub async fn delete_node(&self, node: &Node) -> ApiResult<Vec<Node>> {
        let path = path_segment(API_URL_NODE, &node.id);
        match self.transport.delete(&path, &RequestOptions::default()).await {
            Ok(_) => {
                let nodes = self.store.remove_node(&node.id).await;
                info!(id = %node.id, "Deleted Node \"{}\"", node.name);
                Ok(nodes)
            }
            Err(e) => {
                warn!(id = %node.id, error = %e, "Failed to delete node");
                Err(e)
            }
        }
    }

    /// Delete a pre-auth key and drop it from the store
    pub async fn delete_pre_auth_key(&self, pak: &PreAuthKey) -> ApiResult<Vec<PreAuthKey>> {
        let path = with_query(API_URL_PREAUTHKEY, "id", &pak.id);
        match self.transport.delete(&path, &RequestOptions::default()).await {
            Ok(_) => {
                let keys = self.store.remove_pre_auth_key(&pak.id).await;
                info!(id = %pak.id, "Deleted PreAuthKey");
                Ok(keys)
            }
            Err(e) => {
                warn!(id = %pak.id, error = %e, "Failed to delete pre-auth key");
                Err(e)
            }
        }
    }

    /// Expire the API key identified by the prefix of `api_key`
    ///
    /// A key without a recognisable prefix is skipped without contacting the
    /// server.
    pub async fn expire_api_key(&self, api_key: &str) -> ApiResult<ExpireOutcome> {
        let Some(prefix) = api_key_prefix(api_key) else {
            warn!("Invalid API Key/Prefix, skipping expiry");
            return Ok(ExpireOutcome::Skipped);
        };

        let path = format!("{}/expire", API_URL_APIKEY);
        let body = serde_json::to_value(ExpireApiKeyRequest {
            prefix: prefix.clone(),
        })?;
        match self
            .transport
            .post(&path, body, &RequestOptions::default())
            .await
        {
            Ok(_) => {
                info!(prefix = %prefix, "Expired API Key");
                Ok(ExpireOutcome::Expired { prefix })
            }
            Err(e) => {
                warn!(prefix = %prefix, error = %e, "Failed to expire API key");
                Err(e)
            }
        }
    }

    /// Reload users, nodes and pre-auth keys into the store
    ///
    /// All three are fetched concurrently; the store is only replaced when
    /// every fetch succeeds.
    pub async fn refresh(&self, opts: &RequestOptions) -> ApiResult<StoreSnapshot> {
        let (users, nodes, pre_auth_keys) = futures::try_join!(
            self.get_users(None, opts),
            self.get_nodes(opts),
            self.get_pre_auth_keys(None, opts),
        )?;

        let snapshot = self
            .store
            .replace_all(StoreSnapshot {
                users,
                nodes,
                pre_auth_keys,
            })
            .await;

        info!(
            users = snapshot.users.len(),
            nodes = snapshot.nodes.len(),
            pre_auth_keys = snapshot.pre_auth_keys.len(),
            "Store refreshed"
        );
        Ok(snapshot)
    }
}
