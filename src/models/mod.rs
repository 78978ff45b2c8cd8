//! Data models
//!
//! Mirrors of the JSON records returned by the Headscale REST API. The
//! client does not interpret these beyond identifier equality; everything
//! else is passed through to the caller.

mod api_key;
mod node;
mod policy;
mod pre_auth_key;
mod user;

pub use api_key::*;
pub use node::*;
pub use policy::*;
pub use pre_auth_key::*;
pub use user::*;

/// An entity addressable by its server-assigned identifier
pub trait Identified {
    fn id(&self) -> &str;
}
