//! Expiry-aware key/value store contract.

use crate::error::StoreError;
use async_trait::async_trait;
use std::time::Duration;

/// Result of an atomic [`KeyStore::decrement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decrement {
    /// The value was positive and now holds the given count.
    Remaining(u64),
    /// The value was already zero; nothing was written.
    Exhausted,
    /// No live value exists for the key.
    Missing,
}

/// Store interface owning every persisted value of the service.
///
/// All operations are individually atomic with respect to concurrent callers.
/// Expiry is logical: an entry whose TTL has elapsed is reported absent even
/// if the backend has not physically purged it yet.
///
/// # Implementations
///
/// - [`crate::infrastructure::store::MemoryStore`] - In-process, sharded locks
/// - [`crate::infrastructure::store::RedisStore`] - Redis with bounded command timeouts
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Stores `value` under `key`, replacing any existing value and resetting its TTL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] or [`StoreError::Timeout`] when the
    /// backing medium cannot be reached.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Returns the live value under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Atomically decrements an integer value without going below zero.
    ///
    /// The key keeps its TTL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidData`] if the stored value is not an integer.
    async fn decrement(&self, key: &str) -> Result<Decrement, StoreError>;

    /// Inserts `value` only if `key` holds no live value.
    ///
    /// Returns `true` when the value was created. Two concurrent callers racing
    /// for the same key can never both observe `true`.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
    -> Result<bool, StoreError>;

    /// Remaining lifetime of a live key.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError>;

    /// Checks that the backend is reachable.
    async fn health_check(&self) -> bool;
}
