//! URL normalization and the default URL predicates.
//!
//! Scheme enforcement runs before any check that depends on scheme presence:
//! a URL without a scheme is served over HTTPS, an explicit `http://` is kept.

use crate::domain::validator::UrlValidator;
use url::Url;

/// Longest URL accepted for shortening.
pub const MAX_URL_LENGTH: usize = 2048;

/// Prepends `https://` when `input` carries no scheme.
///
/// This is a normalization policy, not a security guarantee: explicit
/// `http://` URLs are not upgraded.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(enforce_scheme("example.com/page"), "https://example.com/page");
/// assert_eq!(enforce_scheme("http://example.com"), "http://example.com");
/// ```
pub fn enforce_scheme(input: &str) -> String {
    let trimmed = input.trim();
    if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches("//"))
    }
}

/// Schemes without an authority part that are kept as written.
const OPAQUE_SCHEMES: &[&str] = &["mailto", "javascript", "data", "tel", "sms", "urn"];

/// Detects a leading `scheme://` or a known opaque scheme such as `mailto:`.
///
/// Only the text before the first `:` is considered, so a `://` inside the
/// path or query does not count. `host:port` and `user:pass@host` prefixes
/// are not schemes.
fn has_scheme(input: &str) -> bool {
    let Some((scheme, rest)) = input.split_once(':') else {
        return false;
    };

    if !is_scheme_token(scheme) {
        return false;
    }

    rest.starts_with("//") || OPAQUE_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str())
}

/// `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
fn is_scheme_token(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_alphabetic())
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Extracts the host of `url` in lowercase with any `www.` prefix removed.
pub fn canonical_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}

/// Default [`UrlValidator`] backed by the `url` crate.
///
/// - Valid URLs are HTTP(S), have a host, and fit in [`MAX_URL_LENGTH`]
/// - Blocked URLs target the shortener's own domain (with or without `www.`)
#[derive(Debug, Clone)]
pub struct HostValidator {
    own_host: String,
}

impl HostValidator {
    /// Creates a validator for a service published under `public_domain`.
    ///
    /// `public_domain` may be a bare host (`myshortener.com`), a host with a
    /// port, or a full base URL.
    pub fn new(public_domain: &str) -> Self {
        let own_host = canonical_host(&enforce_scheme(public_domain))
            .unwrap_or_else(|| public_domain.trim().to_ascii_lowercase());
        Self { own_host }
    }

    pub fn own_host(&self) -> &str {
        &self.own_host
    }
}

impl UrlValidator for HostValidator {
    fn is_valid_url(&self, url: &str) -> bool {
        if url.is_empty() || url.len() > MAX_URL_LENGTH {
            return false;
        }

        match Url::parse(url) {
            Ok(parsed) => {
                matches!(parsed.scheme(), "http" | "https")
                    && parsed.host_str().is_some_and(|h| !h.is_empty())
            }
            Err(_) => false,
        }
    }

    fn is_blocked_domain(&self, url: &str) -> bool {
        canonical_host(url).is_some_and(|host| host == self.own_host)
    }
}
