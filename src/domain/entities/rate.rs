//! Rate-limit entities.

use std::time::Duration;

/// Key namespace for rate records.
const RATE_KEY_PREFIX: &str = "rate:";

/// A client's remaining quota in the current window.
///
/// Stored as a decimal integer string so the Redis backend can `DECR` it in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateRecord {
    pub remaining: u64,
}

impl RateRecord {
    /// Store key for a client identifier.
    pub fn storage_key(client_id: &str) -> String {
        format!("{}{}", RATE_KEY_PREFIX, client_id)
    }

    pub fn encode(&self) -> String {
        self.remaining.to_string()
    }
}

/// Outcome of [`crate::application::services::RateLimiter::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Quota left after this request (0 when rejected).
    pub remaining: u64,
    /// Time until the window resets and the quota is restored.
    pub reset_in: Duration,
}

impl RateDecision {
    pub fn allowed(remaining: u64, reset_in: Duration) -> Self {
        Self {
            allowed: true,
            remaining,
            reset_in,
        }
    }

    pub fn rejected(reset_in: Duration) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            reset_in,
        }
    }
}
