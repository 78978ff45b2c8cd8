//! Shared helpers

pub mod api_key;
pub mod error;
pub mod validation;

pub use api_key::api_key_prefix;
pub use error::{ApiError, ApiResult};
