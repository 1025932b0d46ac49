//! Redis-backed [`KeyStore`].

use crate::domain::repositories::{Decrement, KeyStore};
use crate::error::StoreError;
use async_trait::async_trait;
use redis::{Client, Script, aio::ConnectionManager};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Check-then-`DECR` so a counter never goes below zero.
///
/// Returns -2 for a missing key, -1 for an exhausted counter, otherwise the
/// new value. `DECR` keeps the key's TTL.
const DECREMENT_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if not current then
  return -2
end
local n = tonumber(current)
if not n then
  return redis.error_reply('value is not an integer')
end
if n <= 0 then
  return -1
end
return redis.call('DECR', KEYS[1])
"#;

/// Connection settings for [`RedisStore`].
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    pub url: String,
    /// Bound on establishing the connection and the initial PING.
    pub connect_timeout: Duration,
    /// Bound on every individual command.
    pub command_timeout: Duration,
}

impl RedisStoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(2),
            command_timeout: Duration::from_millis(250),
        }
    }
}

/// Redis key store relying on server-side atomic primitives.
///
/// - `set_if_absent` is a single `SET NX PX`
/// - `decrement` is a Lua script, atomic on the server
/// - every command is bounded by `command_timeout` and fails with
///   [`StoreError::Timeout`] instead of hanging the request
///
/// Connection reuse goes through `ConnectionManager`, which reconnects on
/// failure.
pub struct RedisStore {
    connection: ConnectionManager,
    decrement_script: Script,
    command_timeout: Duration,
}

impl RedisStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the URL is invalid or the server
    /// cannot be reached, [`StoreError::Timeout`] if connecting exceeds
    /// `connect_timeout`.
    pub async fn connect(config: RedisStoreConfig) -> Result<Self, StoreError> {
        info!("Connecting to Redis at {}", config.url);

        let client = Client::open(config.url.as_str()).map_err(|e| {
            StoreError::Unavailable(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| StoreError::Timeout(config.connect_timeout))?
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect to Redis: {}", e)))?;

        let store = Self {
            connection: manager,
            decrement_script: Script::new(DECREMENT_SCRIPT),
            command_timeout: config.command_timeout,
        };

        let mut conn = store.connection.clone();
        bounded(
            config.connect_timeout,
            redis::cmd("PING").query_async::<()>(&mut conn),
        )
        .await
        .map_err(|e| StoreError::Unavailable(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(store)
    }

    async fn run<T, F>(&self, op: &'static str, key: &str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        bounded(self.command_timeout, fut).await.inspect_err(|e| {
            warn!(op, key, error = %e, "Redis command failed");
        })
    }
}

/// Applies `limit` to a Redis future, mapping both failure modes to [`StoreError`].
async fn bounded<T, F>(limit: Duration, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

/// Upper bound for `PX`. Redis adds it to the clock as a signed 64-bit
/// millisecond timestamp.
const MAX_PX_MILLIS: u64 = i64::MAX as u64 / 2;

/// Milliseconds for `PX`, never zero (Redis rejects a zero expiry).
fn ttl_millis(ttl: Duration) -> Result<u64, StoreError> {
    u64::try_from(ttl.as_millis())
        .ok()
        .filter(|millis| *millis <= MAX_PX_MILLIS)
        .map(|millis| millis.max(1))
        .ok_or_else(|| {
            StoreError::InvalidData(format!("ttl of {}s is out of range", ttl.as_secs()))
        })
}

/// Maps the decrement script's reply to [`Decrement`].
fn decode_decrement(reply: i64) -> Decrement {
    match reply {
        -2 => Decrement::Missing,
        n if n < 0 => Decrement::Exhausted,
        n => Decrement::Remaining(n as u64),
    }
}

/// Maps a `PTTL` reply to a remaining lifetime.
///
/// -2 means missing, -1 means no expiry; neither is a live TTL.
fn decode_pttl(reply: i64) -> Option<Duration> {
    (reply >= 0).then(|| Duration::from_millis(reply as u64))
}

#[async_trait]
impl KeyStore for RedisStore {
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let cmd = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("PX")
            .arg(ttl_millis(ttl)?)
            .to_owned();

        self.run("SET", key, cmd.query_async::<()>(&mut conn)).await?;
        debug!("Store SET: {} (TTL: {}s)", key, ttl.as_secs());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection.clone();
        let cmd = redis::cmd("GET").arg(key).to_owned();

        self.run("GET", key, cmd.query_async::<Option<String>>(&mut conn))
            .await
    }

    async fn decrement(&self, key: &str) -> Result<Decrement, StoreError> {
        let mut conn = self.connection.clone();
        let mut invocation = self.decrement_script.prepare_invoke();
        invocation.key(key);

        let reply = self
            .run("DECR", key, invocation.invoke_async::<i64>(&mut conn))
            .await
            .map_err(|e| match e {
                StoreError::Unavailable(msg) if msg.contains("not an integer") => {
                    StoreError::InvalidData(format!("value under '{}' is not a counter", key))
                }
                other => other,
            })?;

        Ok(decode_decrement(reply))
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut conn = self.connection.clone();
        let cmd = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(ttl_millis(ttl)?)
            .to_owned();

        let reply = self
            .run("SET NX", key, cmd.query_async::<Option<String>>(&mut conn))
            .await?;

        let created = reply.is_some();
        debug!("Store SET NX: {} -> created={}", key, created);
        Ok(created)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, StoreError> {
        let mut conn = self.connection.clone();
        let cmd = redis::cmd("PTTL").arg(key).to_owned();

        let reply = self
            .run("PTTL", key, cmd.query_async::<i64>(&mut conn))
            .await?;
        Ok(decode_pttl(reply))
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.connection.clone();
        bounded(
            self.command_timeout,
            redis::cmd("PING").query_async::<()>(&mut conn),
        )
        .await
        .is_ok()
    }
}
