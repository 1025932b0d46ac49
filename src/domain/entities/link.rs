//! Short code and URL record entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Key namespace for URL records.
const URL_KEY_PREFIX: &str = "url:";

/// A short code identifying a stored URL mapping.
///
/// Codes are either generated by [`crate::application::services::TokenGenerator`]
/// or supplied by the caller after passing
/// [`crate::utils::code_generator::validate_custom_code`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the full short link for this code under `base_url`.
    ///
    /// A base without a scheme is served over HTTPS.
    pub fn to_url(&self, base_url: &str) -> String {
        let base = base_url.trim_end_matches('/');
        if base.contains("://") {
            format!("{}/{}", base, self.0)
        } else {
            format!("https://{}/{}", base, self.0)
        }
    }
}

impl fmt::Display for ShortCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored `short code -> original URL` mapping with its time-to-live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub code: ShortCode,
    pub original_url: String,
    pub ttl: Duration,
}

impl UrlRecord {
    pub fn new(code: ShortCode, original_url: impl Into<String>, ttl: Duration) -> Self {
        Self {
            code,
            original_url: original_url.into(),
            ttl,
        }
    }

    /// Store key for a short code.
    pub fn storage_key(code: &str) -> String {
        format!("{}{}", URL_KEY_PREFIX, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_url_with_bare_domain() {
        let code = ShortCode::new("abc1234");
        assert_eq!(code.to_url("myshortener.com"), "https://myshortener.com/abc1234");
    }

    #[test]
    fn test_to_url_keeps_explicit_scheme() {
        let code = ShortCode::new("abc1234");
        assert_eq!(
            code.to_url("http://localhost:3000/"),
            "http://localhost:3000/abc1234"
        );
    }

    #[test]
    fn test_storage_key_is_namespaced() {
        assert_eq!(UrlRecord::storage_key("promo"), "url:promo");
    }

    #[test]
    fn test_short_code_serializes_as_string() {
        let json = serde_json::to_string(&ShortCode::new("xyz")).unwrap();
        assert_eq!(json, "\"xyz\"");
    }
}
