//! In-memory store implementation using moka

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::stream;
use moka::future::Cache as MokaCache;
use moka::Expiry;

use crate::domain::cache::{Cache, KeyStream};
use crate::domain::DomainError;

/// Configuration for in-memory store
#[derive(Debug, Clone)]
pub struct InMemoryCacheConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
}

impl Default for InMemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

impl InMemoryCacheConfig {
    /// Creates a new configuration with specified max capacity
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Entry stored in moka
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Serialized JSON value
    data: String,
    ttl: Duration,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(data: &str, ttl: Duration) -> Self {
        Self {
            data: data.to_string(),
            ttl,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Evicts each entry after its own TTL
struct PerEntryTtl;

impl Expiry<String, CacheEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Thread-safe in-memory store
///
/// Entries expire individually. Capacity overflow evicts by moka's
/// TinyLFU policy, which may drop a result without its metadata.
#[derive(Debug)]
pub struct InMemoryCache {
    cache: MokaCache<String, CacheEntry>,
}

impl InMemoryCache {
    /// Creates a new in-memory store with default configuration
    pub fn new() -> Self {
        Self::with_config(InMemoryCacheConfig::default())
    }

    /// Creates a new in-memory store with the given configuration
    pub fn with_config(config: InMemoryCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();

        Self { cache }
    }

    /// Expired entries are left for moka to evict
    async fn live_entry(&self, key: &str) -> Option<CacheEntry> {
        self.cache.get(key).await.filter(|entry| !entry.is_expired())
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.live_entry(key).await.map(|entry| entry.data))
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        if ttl.is_zero() {
            return Err(DomainError::cache(format!("Refusing zero TTL for key '{}'", key)));
        }

        self.cache
            .insert(key.to_string(), CacheEntry::new(value, ttl))
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.cache.remove(key).await.is_some())
    }

    fn scan_prefix<'a>(&'a self, prefix: &'a str) -> KeyStream<'a> {
        // Snapshot taken at enumeration time
        let keys: Vec<Result<String, DomainError>> = self
            .cache
            .iter()
            .filter(|(key, entry)| key.starts_with(prefix) && !entry.is_expired())
            .map(|(key, _)| Ok(key.as_ref().clone()))
            .collect();

        Box::pin(stream::iter(keys))
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        Ok(self
            .live_entry(key)
            .await
            .map(|entry| entry.expires_at.saturating_duration_since(Instant::now())))
    }

    async fn size(&self) -> Result<usize, DomainError> {
        self.cache.run_pending_tasks().await;
        Ok(self.cache.entry_count() as usize)
    }
}
