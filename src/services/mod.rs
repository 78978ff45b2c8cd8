//! Headscale API services
//!
//! [`HeadscaleService`] ties a [`Transport`] to the shared [`AppStore`]. Its
//! read-side methods live in [`accessors`], the delete/expire side in
//! [`mutators`].

use std::sync::Arc;

pub mod accessors;
pub mod headscale;
pub mod mutators;
pub mod store;
pub mod transport;

pub use accessors::{filter_pre_auth_keys, UserFilter, UserFilterParts};
pub use headscale::HeadscaleClient;
pub use mutators::ExpireOutcome;
pub use store::{AppStore, StoreSnapshot};
pub use transport::{RequestOptions, Transport};

/// Entity operations over a transport and the application store
#[derive(Clone)]
pub struct HeadscaleService {
    transport: Arc<dyn Transport>,
    store: Arc<AppStore>,
}

impl HeadscaleService {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<AppStore>) -> Self {
        Self { transport, store }
    }

    /// Store the mutators write into
    pub fn store(&self) -> &Arc<AppStore> {
        &self.store
    }
}
