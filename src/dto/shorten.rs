//! DTOs for URL shortening.

use serde::{Deserialize, Serialize};
use serde_with::{DurationSeconds, serde_as};
use std::time::Duration;
use validator::Validate;

/// Request to shorten a URL.
///
/// ```json
/// {"url": "example.com/page", "short": "promo", "expiry": 3600}
/// ```
#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The URL to shorten; a missing scheme is filled in as `https://`.
    #[validate(length(min = 1, max = 2048, message = "url must be 1-2048 characters"))]
    pub url: String,

    /// Optional custom short code. An empty string means "generate one".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 32, message = "short code must be at most 32 characters"))]
    pub short: Option<String>,

    /// Requested lifetime in seconds. Absent or zero means the service default.
    #[serde_as(as = "Option<DurationSeconds<u64>>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<Duration>,
}

impl ShortenRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_short(mut self, code: impl Into<String>) -> Self {
        self.short = Some(code.into());
        self
    }

    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = Some(expiry);
        self
    }

    /// Custom code, treating an empty string as absent.
    pub fn custom_code(&self) -> Option<&str> {
        self.short.as_deref().filter(|code| !code.is_empty())
    }

    /// Requested expiry, or `default` when absent or zero.
    pub fn effective_expiry(&self, default: Duration) -> Duration {
        self.expiry
            .filter(|expiry| !expiry.is_zero())
            .unwrap_or(default)
    }
}

/// Successful shortening result.
///
/// ```json
/// {"url": "https://example.com/page", "short": "https://sho.rt/promo",
///  "expiry": 86400, "rate_limit": 9, "rate_limit_reset": 1800}
/// ```
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenResponse {
    /// Normalized original URL.
    pub url: String,

    /// Full short link.
    pub short: String,

    #[serde_as(as = "DurationSeconds<u64>")]
    pub expiry: Duration,

    /// Quota left in the current window after this request.
    pub rate_limit: u64,

    #[serde_as(as = "DurationSeconds<u64>")]
    pub rate_limit_reset: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_minimal_json() {
        let req: ShortenRequest = serde_json::from_str(r#"{"url": "example.com"}"#).unwrap();
        assert_eq!(req.url, "example.com");
        assert!(req.short.is_none());
        assert!(req.expiry.is_none());
    }

    #[test]
    fn test_request_full_json() {
        let req: ShortenRequest =
            serde_json::from_str(r#"{"url": "example.com", "short": "promo", "expiry": 3600}"#)
                .unwrap();
        assert_eq!(req.custom_code(), Some("promo"));
        assert_eq!(req.expiry, Some(Duration::from_secs(3600)));
    }

    #[test]
    fn test_request_rejects_negative_expiry() {
        let result = serde_json::from_str::<ShortenRequest>(r#"{"url": "a.io", "expiry": -5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_short_means_generated() {
        let req = ShortenRequest::new("example.com").with_short("");
        assert_eq!(req.custom_code(), None);
    }

    #[test]
    fn test_effective_expiry() {
        let default = Duration::from_secs(86_400);

        assert_eq!(ShortenRequest::new("a.io").effective_expiry(default), default);
        assert_eq!(
            ShortenRequest::new("a.io")
                .with_expiry(Duration::ZERO)
                .effective_expiry(default),
            default
        );
        assert_eq!(
            ShortenRequest::new("a.io")
                .with_expiry(Duration::from_secs(60))
                .effective_expiry(default),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_request_validation() {
        assert!(ShortenRequest::new("example.com").validate().is_ok());
        assert!(ShortenRequest::new("").validate().is_err());
        assert!(ShortenRequest::new("a".repeat(2049)).validate().is_err());
        assert!(
            ShortenRequest::new("example.com")
                .with_short("x".repeat(33))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_response_durations_in_seconds() {
        let resp = ShortenResponse {
            url: "https://example.com".into(),
            short: "https://sho.rt/abc1234".into(),
            expiry: Duration::from_secs(86_400),
            rate_limit: 9,
            rate_limit_reset: Duration::from_secs(1800),
        };

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["expiry"], 86_400);
        assert_eq!(json["rate_limit"], 9);
        assert_eq!(json["rate_limit_reset"], 1800);
        assert_eq!(json["short"], "https://sho.rt/abc1234");
    }
}
