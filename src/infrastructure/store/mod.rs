//! [`KeyStore`](crate::domain::repositories::KeyStore) backends.
//!
//! - [`MemoryStore`] - single-process DashMap store with a background sweeper
//! - [`RedisStore`] - shared Redis store using server-side atomic commands

pub mod memory_store;
pub mod redis_store;

pub use memory_store::MemoryStore;
pub use redis_store::{RedisStore, RedisStoreConfig};
