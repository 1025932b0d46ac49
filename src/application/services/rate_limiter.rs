//! Fixed-window per-client quota on top of a [`KeyStore`].

use crate::domain::entities::{RateDecision, RateRecord};
use crate::domain::repositories::{Decrement, KeyStore};
use crate::error::StoreError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_QUOTA: u64 = 10;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(30 * 60);

/// Create/decrement rounds before a contended key is reported as an error.
const MAX_ROUNDS: usize = 3;

/// Per-client request quota.
///
/// The window starts at a client's first request: the record is created with
/// `max_quota - 1` and a TTL of one window, every later request decrements
/// it, and expiry of the record restores the full quota.
pub struct RateLimiter<S: KeyStore + ?Sized> {
    store: Arc<S>,
    max_quota: u64,
    window: Duration,
}

impl<S: KeyStore + ?Sized> RateLimiter<S> {
    pub fn new(store: Arc<S>, max_quota: u64, window: Duration) -> Self {
        Self {
            store,
            max_quota,
            window,
        }
    }

    pub fn max_quota(&self) -> u64 {
        self.max_quota
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Counts one request from `client_id` against its quota.
    ///
    /// A rejected request leaves the record untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on store failure, or
    /// [`StoreError::Unavailable`] if the record keeps vanishing between the
    /// create and decrement steps.
    pub async fn check(&self, client_id: &str) -> Result<RateDecision, StoreError> {
        let key = RateRecord::storage_key(client_id);

        if self.max_quota == 0 {
            return Ok(RateDecision::rejected(self.window));
        }

        for _ in 0..MAX_ROUNDS {
            match self.store.decrement(&key).await? {
                Decrement::Remaining(remaining) => {
                    let reset_in = self.reset_in(&key).await?;
                    return Ok(RateDecision::allowed(remaining, reset_in));
                }
                Decrement::Exhausted => {
                    let reset_in = self.reset_in(&key).await?;
                    debug!(client_id, reset_in_secs = reset_in.as_secs(), "Quota exhausted");
                    return Ok(RateDecision::rejected(reset_in));
                }
                Decrement::Missing => {
                    let record = RateRecord {
                        remaining: self.max_quota - 1,
                    };
                    if self
                        .store
                        .set_if_absent(&key, &record.encode(), self.window)
                        .await?
                    {
                        debug!(client_id, "Opened rate window");
                        return Ok(RateDecision::allowed(record.remaining, self.window));
                    }
                    // Another request created the window first; decrement it.
                }
            }
        }

        warn!(client_id, rounds = MAX_ROUNDS, "Rate record kept changing under contention");
        Err(StoreError::Unavailable(format!(
            "rate record for '{}' is contended",
            client_id
        )))
    }

    /// Time until the window behind `key` resets.
    ///
    /// Falls back to the full window when the key has no TTL left.
    async fn reset_in(&self, key: &str) -> Result<Duration, StoreError> {
        Ok(self.store.ttl(key).await?.unwrap_or(self.window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockKeyStore;
    use crate::infrastructure::store::MemoryStore;

    fn limiter(quota: u64) -> RateLimiter<MemoryStore> {
        RateLimiter::new(Arc::new(MemoryStore::new()), quota, DEFAULT_WINDOW)
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_request_opens_window() {
        let limiter = limiter(10);

        let decision = limiter.check("1.2.3.4").await.unwrap();

        assert!(decision.allowed);
        assert_eq!(decision.remaining, 9);
        assert_eq!(decision.reset_in, DEFAULT_WINDOW);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quota_boundary() {
        let limiter = limiter(10);

        for expected in (0..10).rev() {
            let decision = limiter.check("c").await.unwrap();
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected);
        }

        let decision = limiter.check("c").await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_in_counts_down() {
        let limiter = limiter(3);
        limiter.check("c").await.unwrap();

        tokio::time::advance(Duration::from_secs(600)).await;

        let decision = limiter.check("c").await.unwrap();
        assert_eq!(decision.reset_in, DEFAULT_WINDOW - Duration::from_secs(600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_expiry_restores_quota() {
        let limiter = limiter(2);
        limiter.check("c").await.unwrap();
        limiter.check("c").await.unwrap();
        assert!(!limiter.check("c").await.unwrap().allowed);

        tokio::time::advance(DEFAULT_WINDOW).await;

        let decision = limiter.check("c").await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clients_are_independent() {
        let limiter = limiter(1);

        assert!(limiter.check("a").await.unwrap().allowed);
        assert!(!limiter.check("a").await.unwrap().allowed);
        assert!(limiter.check("b").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_zero_quota_rejects_without_store_access() {
        let store = MockKeyStore::new();
        let limiter = RateLimiter::new(Arc::new(store), 0, DEFAULT_WINDOW);

        let decision = limiter.check("c").await.unwrap();
        assert!(!decision.allowed);
    }

    #[tokio::test]
    async fn test_lost_create_falls_back_to_decrement() {
        let mut store = MockKeyStore::new();
        let mut seq = mockall::Sequence::new();
        store
            .expect_decrement()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Decrement::Missing));
        store
            .expect_set_if_absent()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(false));
        store
            .expect_decrement()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Decrement::Remaining(8)));
        store
            .expect_ttl()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(Duration::from_secs(1700))));

        let limiter = RateLimiter::new(Arc::new(store), 10, DEFAULT_WINDOW);
        let decision = limiter.check("c").await.unwrap();

        assert!(decision.allowed);
        assert_eq!(decision.remaining, 8);
        assert_eq!(decision.reset_in, Duration::from_secs(1700));
    }

    #[tokio::test]
    async fn test_contention_is_bounded() {
        let mut store = MockKeyStore::new();
        store
            .expect_decrement()
            .times(MAX_ROUNDS)
            .returning(|_| Ok(Decrement::Missing));
        store
            .expect_set_if_absent()
            .times(MAX_ROUNDS)
            .returning(|_, _, _| Ok(false));

        let limiter = RateLimiter::new(Arc::new(store), 10, DEFAULT_WINDOW);
        let err = limiter.check("c").await.unwrap_err();

        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut store = MockKeyStore::new();
        store
            .expect_decrement()
            .returning(|_| Err(StoreError::Unavailable("connection refused".into())));

        let limiter = RateLimiter::new(Arc::new(store), 10, DEFAULT_WINDOW);
        assert!(limiter.check("c").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_ttl_falls_back_to_window() {
        let mut store = MockKeyStore::new();
        store
            .expect_decrement()
            .returning(|_| Ok(Decrement::Exhausted));
        store.expect_ttl().returning(|_| Ok(None));

        let limiter = RateLimiter::new(Arc::new(store), 10, DEFAULT_WINDOW);
        let decision = limiter.check("c").await.unwrap();

        assert!(!decision.allowed);
        assert_eq!(decision.reset_in, DEFAULT_WINDOW);
    }
}
