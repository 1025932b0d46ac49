//! URL shortening and resolution.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::rate_limiter::{DEFAULT_QUOTA, DEFAULT_WINDOW, RateLimiter};
use crate::application::services::token_generator::{DEFAULT_MAX_ATTEMPTS, TokenGenerator};
use crate::domain::entities::UrlRecord;
use crate::domain::repositories::KeyStore;
use crate::domain::validator::UrlValidator;
use crate::dto::{ShortenRequest, ShortenResponse};
use crate::error::ShortenError;
use crate::utils::code_generator::{CodeAlphabet, validate_custom_code};
use crate::utils::url_normalizer::enforce_scheme;
use tracing::{debug, info, warn};
use validator::Validate;

/// Lifetime of a record when the request does not ask for one.
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest lifetime a request may ask for.
pub const DEFAULT_MAX_EXPIRY: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Policy knobs of [`ShorteningService`].
#[derive(Debug, Clone)]
pub struct ShortenerSettings {
    /// Domain (or base URL) short links are published under.
    pub public_domain: String,
    pub default_expiry: Duration,
    /// Requests asking for a longer expiry are rejected as malformed.
    pub max_expiry: Duration,
    pub max_quota: u64,
    pub rate_window: Duration,
    pub alphabet: CodeAlphabet,
    pub max_attempts: usize,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self {
            public_domain: "localhost:3000".to_string(),
            default_expiry: DEFAULT_EXPIRY,
            max_expiry: DEFAULT_MAX_EXPIRY,
            max_quota: DEFAULT_QUOTA,
            rate_window: DEFAULT_WINDOW,
            alphabet: CodeAlphabet::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Service for creating and resolving short links.
///
/// A shorten request passes through these stages in order, stopping at the
/// first failure:
///
/// 1. Rate check against the client's quota
/// 2. Request validation, the expiry cap and `https://` scheme normalization
/// 3. URL syntax and self-reference checks through [`UrlValidator`]
/// 4. Custom code format check
/// 5. Atomic code claim that also stores the record
///
/// Nothing is written to the URL namespace unless every earlier stage passed.
pub struct ShorteningService<S, V>
where
    S: KeyStore + ?Sized,
    V: UrlValidator + ?Sized,
{
    store: Arc<S>,
    validator: Arc<V>,
    rate_limiter: RateLimiter<S>,
    tokens: TokenGenerator,
    public_domain: String,
    default_expiry: Duration,
    max_expiry: Duration,
}

impl<S, V> ShorteningService<S, V>
where
    S: KeyStore + ?Sized,
    V: UrlValidator + ?Sized,
{
    pub fn new(store: Arc<S>, validator: Arc<V>, settings: ShortenerSettings) -> Self {
        Self {
            rate_limiter: RateLimiter::new(
                Arc::clone(&store),
                settings.max_quota,
                settings.rate_window,
            ),
            tokens: TokenGenerator::new(settings.alphabet, settings.max_attempts),
            store,
            validator,
            public_domain: settings.public_domain,
            default_expiry: settings.default_expiry,
            max_expiry: settings.max_expiry,
        }
    }

    /// Shortens `req.url` on behalf of `client_id`.
    ///
    /// # Errors
    ///
    /// - [`ShortenError::RateRejected`] when the client's quota is used up
    /// - [`ShortenError::BadRequest`] when the request fails field validation or
    ///   asks for an expiry above the configured maximum
    /// - [`ShortenError::InvalidUrl`] / [`ShortenError::DomainBlocked`] from the validator
    /// - [`ShortenError::InvalidShortCode`] for a malformed or reserved custom code
    /// - [`ShortenError::CodeTaken`] / [`ShortenError::GenerationExhausted`] from issuance
    /// - [`ShortenError::StoreUnavailable`] on store failure at any stage
    pub async fn shorten(
        &self,
        req: &ShortenRequest,
        client_id: &str,
    ) -> Result<ShortenResponse, ShortenError> {
        let result = self.run_stages(req, client_id).await;
        record_outcome(&result, client_id);
        result
    }

    async fn run_stages(
        &self,
        req: &ShortenRequest,
        client_id: &str,
    ) -> Result<ShortenResponse, ShortenError> {
        let rate = self.rate_limiter.check(client_id).await?;
        if !rate.allowed {
            return Err(ShortenError::RateRejected {
                reset_in: rate.reset_in,
            });
        }

        req.validate()?;

        let expiry = req.effective_expiry(self.default_expiry);
        if expiry > self.max_expiry {
            return Err(ShortenError::BadRequest(format!(
                "expiry of {}s exceeds the maximum of {}s",
                expiry.as_secs(),
                self.max_expiry.as_secs()
            )));
        }

        let url = enforce_scheme(&req.url);
        if !self.validator.is_valid_url(&url) {
            return Err(ShortenError::InvalidUrl(url));
        }
        if self.validator.is_blocked_domain(&url) {
            return Err(ShortenError::DomainBlocked(url));
        }

        let custom = req.custom_code();
        if let Some(code) = custom {
            validate_custom_code(code)?;
        }

        let code = self
            .tokens
            .issue(self.store.as_ref(), custom, &url, expiry)
            .await?;

        Ok(ShortenResponse {
            short: code.to_url(&self.public_domain),
            url,
            expiry,
            rate_limit: rate.remaining,
            rate_limit_reset: rate.reset_in,
        })
    }

    /// Returns the original URL behind `code`.
    ///
    /// # Errors
    ///
    /// Returns [`ShortenError::NotFound`] for unknown or expired codes and
    /// [`ShortenError::StoreUnavailable`] on store failure.
    pub async fn resolve(&self, code: &str) -> Result<String, ShortenError> {
        match self.store.get(&UrlRecord::storage_key(code)).await {
            Ok(Some(url)) => {
                metrics::counter!("tinylink_resolve_total", "outcome" => "hit").increment(1);
                Ok(url)
            }
            Ok(None) => {
                metrics::counter!("tinylink_resolve_total", "outcome" => "miss").increment(1);
                debug!(code, "Short code not found");
                Err(ShortenError::NotFound(code.to_string()))
            }
            Err(e) => {
                warn!(code, error = %e, "Resolve failed");
                Err(e.into())
            }
        }
    }

    /// Whether the backing store answers.
    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }

    pub fn public_domain(&self) -> &str {
        &self.public_domain
    }
}

fn record_outcome(result: &Result<ShortenResponse, ShortenError>, client_id: &str) {
    let outcome = match result {
        Ok(resp) => {
            info!(
                client_id,
                short = %resp.short,
                expiry_secs = resp.expiry.as_secs(),
                "Short link created"
            );
            "created"
        }
        Err(e) => {
            let kind = e.kind().as_str();
            match e {
                ShortenError::StoreUnavailable(_) => {
                    warn!(client_id, kind, error = %e, "Shorten failed")
                }
                // GenerationExhausted is already logged at error level by the generator.
                ShortenError::GenerationExhausted { .. } => {}
                _ => debug!(client_id, kind, error = %e, "Shorten rejected"),
            }
            kind
        }
    };
    metrics::counter!("tinylink_shorten_total", "outcome" => outcome).increment(1);
}
