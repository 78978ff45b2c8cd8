//! Headscale Admin Library
//!
//! Typed bindings for the Headscale REST API and an in-memory store that
//! mirrors the users, nodes and pre-auth keys views consume.

use std::sync::Arc;

pub mod config;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use services::{
    AppStore, ExpireOutcome, HeadscaleClient, HeadscaleService, RequestOptions, StoreSnapshot,
    Transport, UserFilter, UserFilterParts,
};
pub use utils::error::{ApiError, ApiResult};

/// Application state shared across commands
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Entity operations bound to the shared store
    pub headscale: HeadscaleService,
}

impl AppState {
    /// Build the HTTP client and an empty store from configuration
    pub fn new(config: AppConfig) -> ApiResult<Self> {
        let client = HeadscaleClient::new(&config.headscale)?;
        let headscale = HeadscaleService::new(Arc::new(client), Arc::new(AppStore::new()));
        Ok(Self { config, headscale })
    }

    pub fn store(&self) -> &Arc<AppStore> {
        self.headscale.store()
    }
}
