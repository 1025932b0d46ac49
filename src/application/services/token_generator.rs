//! Short code issuance with collision handling.

use crate::domain::entities::{ShortCode, UrlRecord};
use crate::domain::repositories::KeyStore;
use crate::error::ShortenError;
use crate::utils::code_generator::CodeAlphabet;
use std::time::Duration;
use tracing::{debug, error};

/// Default number of random codes tried before giving up.
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;

/// Claims short codes in a [`KeyStore`].
///
/// Each claim is a single `set_if_absent` that writes the final URL record,
/// so a code becomes visible only together with its target and TTL.
#[derive(Debug, Clone)]
pub struct TokenGenerator {
    alphabet: CodeAlphabet,
    max_attempts: usize,
}

impl TokenGenerator {
    pub fn new(alphabet: CodeAlphabet, max_attempts: usize) -> Self {
        Self {
            alphabet,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Claims a short code for `url` and stores the mapping for `ttl`.
    ///
    /// A caller-supplied `custom` code gets exactly one attempt. Otherwise
    /// random codes are tried until one is free or the attempt budget runs out.
    ///
    /// # Errors
    ///
    /// - [`ShortenError::CodeTaken`] if `custom` is already live
    /// - [`ShortenError::GenerationExhausted`] if every random code collided
    /// - [`ShortenError::StoreUnavailable`] on store failure
    pub async fn issue<S>(
        &self,
        store: &S,
        custom: Option<&str>,
        url: &str,
        ttl: Duration,
    ) -> Result<ShortCode, ShortenError>
    where
        S: KeyStore + ?Sized,
    {
        if let Some(code) = custom {
            return if store
                .set_if_absent(&UrlRecord::storage_key(code), url, ttl)
                .await?
            {
                Ok(ShortCode::new(code))
            } else {
                Err(ShortenError::CodeTaken(code.to_string()))
            };
        }

        for attempt in 1..=self.max_attempts {
            let code = self.alphabet.generate();
            if store
                .set_if_absent(&UrlRecord::storage_key(&code), url, ttl)
                .await?
            {
                return Ok(ShortCode::new(code));
            }
            debug!(attempt, code = %code, "Generated code collided");
        }

        error!(
            attempts = self.max_attempts,
            code_length = self.alphabet.length(),
            "Failed to generate unique code"
        );
        Err(ShortenError::GenerationExhausted {
            attempts: self.max_attempts,
        })
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new(CodeAlphabet::default(), DEFAULT_MAX_ATTEMPTS)
    }
}
