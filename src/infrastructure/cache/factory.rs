//! Store factory for runtime backend selection

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::cache::Cache;
use crate::domain::DomainError;

use super::in_memory::{InMemoryCache, InMemoryCacheConfig};
use super::redis::{RedisCache, RedisCacheConfig};

/// Supported key-value backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Process-local store using moka
    #[default]
    InMemory,
    /// Shared Redis store
    Redis,
}

impl std::fmt::Display for StoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreType::InMemory => write!(f, "in_memory"),
            StoreType::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for StoreType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(StoreType::InMemory),
            "redis" => Ok(StoreType::Redis),
            _ => Err(DomainError::configuration(format!(
                "Unknown store type: {}. Valid types: in_memory, redis",
                s
            ))),
        }
    }
}

/// Key-value store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreType,
    /// Redis URL (required for the Redis backend)
    pub redis_url: Option<String>,
    /// Key prefix for namespacing (Redis only)
    pub key_prefix: Option<String>,
    /// Maximum entries (in-memory only)
    pub max_capacity: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreType::InMemory,
            redis_url: None,
            key_prefix: None,
            max_capacity: 10_000,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration for the in-memory backend
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Creates a new configuration for the Redis backend
    pub fn redis(url: impl Into<String>) -> Self {
        Self {
            backend: StoreType::Redis,
            redis_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Sets the maximum capacity (in-memory only)
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Factory for creating store instances
#[derive(Debug, Default)]
pub struct StoreFactory;

impl StoreFactory {
    /// Creates a store instance based on configuration
    pub async fn create(config: &StoreConfig) -> Result<Arc<dyn Cache>, DomainError> {
        match config.backend {
            StoreType::InMemory => {
                let store = InMemoryCache::with_config(
                    InMemoryCacheConfig::default().with_max_capacity(config.max_capacity),
                );
                info!(max_capacity = config.max_capacity, "Using in-memory store");

                Ok(Arc::new(store))
            }
            StoreType::Redis => {
                let url = config.redis_url.clone().ok_or_else(|| {
                    DomainError::configuration("store.redis_url is required for the redis backend")
                })?;

                let mut redis_config = RedisCacheConfig::new(url);

                if let Some(prefix) = &config.key_prefix {
                    redis_config = redis_config.with_key_prefix(prefix.clone());
                }

                let store = RedisCache::new(redis_config).await?;
                info!(key_prefix = ?config.key_prefix, "Using Redis store");

                Ok(Arc::new(store))
            }
        }
    }
}
