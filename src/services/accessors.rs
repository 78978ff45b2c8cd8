//! Entity accessors
//!
//! Read-side operations. Each composes a path, performs a single request and
//! unwraps the response envelope. Transport failures are returned to the
//! caller unchanged.

use tracing::debug;

use super::transport::{
    decode, with_query, RequestOptions, API_URL_APIKEY, API_URL_NODE, API_URL_POLICY,
    API_URL_PREAUTHKEY, API_URL_USER,
};
use super::HeadscaleService;
use crate::models::{
    ApiApiKeys, ApiKey, ApiNodes, ApiPolicy, ApiPreAuthKeys, ApiUsers, Node, PreAuthKey,
    SetPolicyRequest, User,
};
use crate::utils::error::{ApiError, ApiResult};

/// Server-side user lookup; exactly one criterion per request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserFilter {
    Id(String),
    Name(String),
    Email(String),
}

impl UserFilter {
    fn apply(&self, path: &str) -> String {
        match self {
            UserFilter::Id(id) => with_query(path, "id", id),
            UserFilter::Name(name) => with_query(path, "name", name),
            UserFilter::Email(email) => with_query(path, "email", email),
        }
    }
}

/// Loose form of a user lookup, as collected from CLI flags or query strings
#[derive(Debug, Clone, Default)]
pub struct UserFilterParts {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl TryFrom<UserFilterParts> for UserFilter {
    type Error = ApiError;

    fn try_from(parts: UserFilterParts) -> Result<Self, Self::Error> {
        match (parts.id, parts.name, parts.email) {
            (Some(id), None, None) => Ok(UserFilter::Id(id)),
            (None, Some(name), None) => Ok(UserFilter::Name(name)),
            (None, None, Some(email)) => Ok(UserFilter::Email(email)),
            _ => Err(ApiError::InvalidArgument(
                "Invalid User Parameters: exactly one of id, name or email is required"
                    .to_string(),
            )),
        }
    }
}

/// Keep only keys owned by one of `user_ids`; an empty list keeps everything
pub fn filter_pre_auth_keys(keys: Vec<PreAuthKey>, user_ids: &[String]) -> Vec<PreAuthKey> {
    if user_ids.is_empty() {
        return keys;
    }
    keys.into_iter()
        .filter(|pak| {
            pak.user_id()
                .map(|owner| user_ids.iter().any(|id| id == owner))
                .unwrap_or(false)
        })
        .collect()
}

impl HeadscaleService {
    /// List users, optionally narrowed by a single filter
    pub async fn get_users(
        &self,
        filter: Option<&UserFilter>,
        opts: &RequestOptions,
    ) -> ApiResult<Vec<User>> {
        let path = match filter {
            Some(filter) => filter.apply(API_URL_USER),
            None => API_URL_USER.to_string(),
        };
        let value = self.transport.get(&path, opts).await?;
        let ApiUsers { users } = decode(&path, value)?;
        debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    /// List all nodes
    pub async fn get_nodes(&self, opts: &RequestOptions) -> ApiResult<Vec<Node>> {
        let value = self.transport.get(API_URL_NODE, opts).await?;
        let ApiNodes { nodes } = decode(API_URL_NODE, value)?;
        debug!(count = nodes.len(), "Fetched nodes");
        Ok(nodes)
    }

    /// List pre-auth keys
    ///
    /// The list endpoint has no user filter, so the full collection is
    /// fetched and narrowed client-side when `user_ids` is non-empty.
    pub async fn get_pre_auth_keys(
        &self,
        user_ids: Option<&[String]>,
        opts: &RequestOptions,
    ) -> ApiResult<Vec<PreAuthKey>> {
        let value = self.transport.get(API_URL_PREAUTHKEY, opts).await?;
        let ApiPreAuthKeys { pre_auth_keys } = decode(API_URL_PREAUTHKEY, value)?;
        debug!(count = pre_auth_keys.len(), "Fetched pre-auth keys");

        Ok(match user_ids {
            Some(ids) => filter_pre_auth_keys(pre_auth_keys, ids),
            None => pre_auth_keys,
        })
    }

    /// Fetch the raw policy document
    pub async fn get_policy(&self, opts: &RequestOptions) -> ApiResult<String> {
        let value = self.transport.get(API_URL_POLICY, opts).await?;
        let ApiPolicy { policy, .. } = decode(API_URL_POLICY, value)?;
        Ok(policy)
    }

    /// Replace the policy document wholesale, returning what the server stored
    pub async fn set_policy(&self, policy: &str, opts: &RequestOptions) -> ApiResult<String> {
        let body = serde_json::to_value(SetPolicyRequest {
            policy: policy.to_string(),
        })?;
        let value = self.transport.put(API_URL_POLICY, body, opts).await?;
        let ApiPolicy { policy, updated_at } = decode(API_URL_POLICY, value)?;
        debug!(updated_at = ?updated_at, "Policy replaced");
        Ok(policy)
    }

    /// List API keys (prefixes and metadata only)
    pub async fn get_api_keys(&self, opts: &RequestOptions) -> ApiResult<Vec<ApiKey>> {
        let value = self.transport.get(API_URL_APIKEY, opts).await?;
        let ApiApiKeys { api_keys } = decode(API_URL_APIKEY, value)?;
        Ok(api_keys)
    }
}
