//! API key prefix extraction
//!
//! Headscale only stores a short prefix of every API key in clear text, so
//! a key that is no longer held in full can still be addressed through it.
//! Two key layouts exist in the wild:
//!
//! - `hskey-api-{prefix}-{secret}` with a 12 character prefix
//! - `{prefix}.{secret}` as issued by older servers

use once_cell::sync::Lazy;
use regex::Regex;

/// Current key layout
static API_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^hskey-api-([A-Za-z0-9]{12})-(.+)$").unwrap());

/// Legacy `prefix.secret` layout
static LEGACY_API_KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9]+)\.(.+)$").unwrap());

/// Extract the prefix from a full API key, `None` if the key has no usable prefix
pub fn api_key_prefix(api_key: &str) -> Option<String> {
    let api_key = api_key.trim();

    API_KEY_REGEX
        .captures(api_key)
        .or_else(|| LEGACY_API_KEY_REGEX.captures(api_key))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
