//! Input validation utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// Regex for validating the Headscale server URL
static BASE_URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://[^\s/?#]+(/[^\s?#]*)?$").unwrap());

/// Validate a server base URL (scheme and host required, no query or fragment)
pub fn validate_base_url(url: &str) -> bool {
    !url.is_empty() && url.len() <= 2048 && BASE_URL_REGEX.is_match(url)
}
