//! Key-value store trait and implementations.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use thiserror::Error;
use tokio::sync::Mutex;

/// Error type for store operations.
///
/// Kept distinct from "key absent": `get` returns `Ok(None)` when a key is
/// missing or expired, and `Err` only when the store itself fails.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous key-value store with per-entry expiry.
///
/// All values are opaque strings; callers serialize before `put` and
/// deserialize after `get`. Expired entries behave exactly like absent ones.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Store `value` under `key`, evicted automatically after `ttl`.
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError>;

    /// Fetch the value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
struct TtlEntry {
    value: String,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, TtlEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &TtlEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process [`KvStore`] backed by `moka::future::Cache`.
///
/// Each entry carries its own TTL, so flow state (minutes) and credentials
/// (an hour) can share one store instance.
pub struct MokaKvStore {
    cache: Cache<String, TtlEntry>,
}

impl MokaKvStore {
    /// Create a store bounded to `max_capacity` entries.
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder().max_capacity(max_capacity).expire_after(PerEntryTtl).build();
        Self { cache }
    }
}

impl Default for MokaKvStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl KvStore for MokaKvStore {
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        self.cache.insert(key.to_owned(), TtlEntry { value, ttl }).await;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.cache.get(key).await.map(|entry| entry.value))
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.cache.invalidate(key).await;
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    deadline: Instant,
    ttl: Duration,
}

/// Deterministic [`KvStore`] for tests: a `HashMap` guarded by a mutex with
/// deadline-checked reads.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryKvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// TTL the live entry under `key` was written with, if any.
    ///
    /// Test observability hook: lets assertions check not just that a value
    /// was stored but for how long.
    pub async fn ttl_of(&self, key: &str) -> Option<Duration> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|entry| entry.deadline > Instant::now())
            .map(|entry| entry.ttl)
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        let entry = MemoryEntry { value, deadline: Instant::now() + ttl, ttl };
        self.entries.lock().await.insert(key.to_owned(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.deadline <= Instant::now() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
