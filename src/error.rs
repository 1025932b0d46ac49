//! Error taxonomy for the shortening core.
//!
//! Every failure is terminal for the request. The transport collaborator maps
//! [`ErrorKind`] to status codes; [`ErrorBody`] is the serialized form.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use validator::ValidationErrors;

/// Errors raised by a [`crate::domain::repositories::KeyStore`] backend.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("stored value is invalid: {0}")]
    InvalidData(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        Self::Unavailable(e.to_string())
    }
}

/// Errors surfaced by [`crate::application::services::ShorteningService`].
#[derive(Debug, Error)]
pub enum ShortenError {
    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("url targets the shortener's own domain: {0}")]
    DomainBlocked(String),

    #[error("rate limit exceeded, retry in {}s", reset_in.as_secs())]
    RateRejected { reset_in: Duration },

    #[error("invalid short code: {0}")]
    InvalidShortCode(String),

    #[error("short code already in use: {0}")]
    CodeTaken(String),

    #[error("could not find a free short code after {attempts} attempts")]
    GenerationExhausted { attempts: usize },

    #[error(transparent)]
    StoreUnavailable(#[from] StoreError),

    #[error("short code not found: {0}")]
    NotFound(String),
}

/// Stable, transport-independent name of the stage that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    InvalidUrl,
    DomainBlocked,
    RateRejected,
    InvalidShortCode,
    CodeTaken,
    GenerationExhausted,
    StoreUnavailable,
    NotFound,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::InvalidUrl => "invalid_url",
            Self::DomainBlocked => "domain_blocked",
            Self::RateRejected => "rate_rejected",
            Self::InvalidShortCode => "invalid_short_code",
            Self::CodeTaken => "code_taken",
            Self::GenerationExhausted => "generation_exhausted",
            Self::StoreUnavailable => "store_unavailable",
            Self::NotFound => "not_found",
        }
    }
}

impl ShortenError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Self::DomainBlocked(_) => ErrorKind::DomainBlocked,
            Self::RateRejected { .. } => ErrorKind::RateRejected,
            Self::InvalidShortCode(_) => ErrorKind::InvalidShortCode,
            Self::CodeTaken(_) => ErrorKind::CodeTaken,
            Self::GenerationExhausted { .. } => ErrorKind::GenerationExhausted,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }

    /// Only infrastructure failures warrant a retry with backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// Whether the failure is caused by the request rather than by the service.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::GenerationExhausted { .. } | Self::StoreUnavailable(_)
        )
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            error: ErrorInfo {
                code: self.kind().as_str(),
                message: self.to_string(),
                retryable: self.is_retryable(),
            },
        }
    }
}

impl From<ValidationErrors> for ShortenError {
    fn from(e: ValidationErrors) -> Self {
        Self::BadRequest(e.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorInfo,
}

#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub retryable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_converts_to_store_unavailable() {
        let err: ShortenError = StoreError::Timeout(Duration::from_millis(250)).into();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
        assert!(err.is_retryable());
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_generation_exhausted_is_operational() {
        let err = ShortenError::GenerationExhausted { attempts: 5 };
        assert!(!err.is_client_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        let errors = [
            ShortenError::InvalidUrl("x".into()),
            ShortenError::DomainBlocked("x".into()),
            ShortenError::CodeTaken("x".into()),
            ShortenError::NotFound("x".into()),
            ShortenError::RateRejected {
                reset_in: Duration::from_secs(60),
            },
        ];

        for err in errors {
            assert!(err.is_client_error(), "{err:?}");
            assert!(!err.is_retryable(), "{err:?}");
        }
    }

    #[test]
    fn test_rate_rejected_message_has_seconds() {
        let err = ShortenError::RateRejected {
            reset_in: Duration::from_secs(90),
        };
        assert_eq!(err.to_string(), "rate limit exceeded, retry in 90s");
    }

    #[test]
    fn test_error_body_serialization() {
        let body = ShortenError::CodeTaken("promo".into()).to_body();
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["error"]["code"], "code_taken");
        assert_eq!(json["error"]["message"], "short code already in use: promo");
        assert_eq!(json["error"]["retryable"], false);
    }
}
