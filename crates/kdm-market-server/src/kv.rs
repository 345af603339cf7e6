//! Ephemeral key-value store seam.
//!
//! Rate-limit markers, pending verification codes, and memoized prices all
//! live in a shared TTL'd store. The trait keeps the components injectable
//! so tests can substitute [`MemoryKv`] for Redis.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;

#[derive(Debug, thiserror::Error)]
pub enum KvError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

/// Shared ephemeral store with per-key TTL.
///
/// Implementations must be thread-safe (`Send + Sync`) as they are called
/// concurrently from request handlers.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch a live value; expired keys read as absent.
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Store a value that expires after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError>;

    /// Drop a key; deleting an absent key is a no-op.
    async fn del(&self, key: &str) -> Result<(), KvError>;
}

/// Redis-backed store used in deployments.
#[derive(Clone)]
pub struct RedisKv {
    connection: ConnectionManager,
}

impl RedisKv {
    pub async fn connect(redis_url: &str) -> Result<Self, KvError> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_millis(500));

        let client = redis::Client::open(redis_url)?;
        let connection = client
            .get_connection_manager_with_config(config)
            .await?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl KvStore for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut con = self.connection.clone();
        Ok(con.get(key).await?)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        let mut con = self.connection.clone();
        let secs = ttl.as_secs().max(1);
        let _: () = con.set_ex(key, value, secs).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), KvError> {
        let mut con = self.connection.clone();
        let _: () = con.del(key).await?;
        Ok(())
    }
}

/// In-memory store for tests and single-process development.
///
/// Tracks cache hits so memoization (e.g. the price resolver) is
/// observable without instrumenting the callers.
#[derive(Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, (String, Instant)>>,
    hits: AtomicU64,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` calls that returned a live value.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut entries = self.entries.lock();

        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Ok(Some(value.clone()))
            }
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        self.entries
            .lock()
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), KvError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_kv_round_trip() {
        let kv = MemoryKv::new();

        kv.set("k", "v", Duration::from_secs(60)).await.unwrap();
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(kv.hits(), 1);

        kv.del("k").await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), None);
        assert_eq!(kv.hits(), 1);
    }

    #[tokio::test]
    async fn memory_kv_expires() {
        let kv = MemoryKv::new();

        kv.set("k", "v", Duration::ZERO).await.unwrap();
        assert_eq!(kv.get("k").await.unwrap(), None);
        assert_eq!(kv.hits(), 0);
    }

    #[tokio::test]
    async fn memory_kv_overwrite_refreshes_value() {
        let kv = MemoryKv::new();

        kv.set("k", "a", Duration::from_secs(60)).await.unwrap();
        kv.set("k", "b", Duration::from_secs(60)).await.unwrap();
        assert_eq!(kv.get("k").await.unwrap().as_deref(), Some("b"));
    }
}
