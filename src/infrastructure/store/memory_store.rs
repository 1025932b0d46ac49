//! In-process [`KeyStore`] backed by DashMap.

use crate::domain::repositories::{Decrement, KeyStore};
use crate::error::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn new(value: &str, ttl: Duration) -> Result<Self, StoreError> {
        let expires_at = Instant::now().checked_add(ttl).ok_or_else(|| {
            StoreError::InvalidData(format!("ttl of {}s is out of range", ttl.as_secs()))
        })?;

        Ok(Self {
            value: value.to_string(),
            expires_at,
        })
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory key store with logical expiry.
///
/// DashMap shards its locks, so operations on different keys proceed in
/// parallel while every operation on one key is serialized by its shard lock.
/// That lock is what makes [`KeyStore::decrement`] and
/// [`KeyStore::set_if_absent`] atomic.
///
/// Deadlines use [`tokio::time::Instant`], which follows tokio's paused clock
/// in tests. Expired entries are hidden immediately and removed by
/// [`MemoryStore::purge_expired`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of physically present entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Spawns a task that purges expired entries every `interval`.
    ///
    /// The task stops once the last other handle to the store is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(store) = store.upgrade() else {
                    break;
                };
                let purged = store.purge_expired();
                if purged > 0 {
                    debug!(purged, "Purged expired entries");
                }
            }
        })
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let entry = Entry::new(value, ttl)?;
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone()))
    }

    async fn decrement(&self, key: &str) -> Result<Decrement, StoreError> {
        let now = Instant::now();
        let Some(mut entry) = self.entries.get_mut(key) else {
            return Ok(Decrement::Missing);
        };

        if entry.is_expired(now) {
            return Ok(Decrement::Missing);
        }

        let current: u64 = entry.value.parse().map_err(|_| {
            StoreError::InvalidData(format!("value under '{}' is not a counter", key))
        })?;

        if current == 0 {
            return Ok(Decrement::Exhausted);
        }

        let next = current - 1;
        entry.value = next.to_string();
        Ok(Decrement::Remaining(next))
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let now = Instant::now();
        let entry = Entry::new(value, ttl)?;
        match self.entries.entry(key.to_string()) {
            MapEntry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(entry);
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(entry);
                Ok(true)
            }
        }
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.expires_at.saturating_duration_since(now)))
    }

    async fn health_check(&self) -> bool {
        true
    }
}
