//! Expiring key-value store trait definition

use std::fmt::Debug;
use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::Stream;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// Lazy sequence of keys produced by a prefix scan
pub type KeyStream<'a> = Pin<Box<dyn Stream<Item = Result<String, DomainError>> + Send + 'a>>;

/// Key-value store with per-key time-to-live
///
/// This trait uses JSON strings internally to be dyn-compatible.
/// Use the helper methods for typed get/set operations.
///
/// Every key is independent: implementations must allow concurrent reads and
/// writes from many callers without cross-key locking.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Gets a raw JSON value, or `None` if the key is missing or expired
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Sets a raw JSON value with a TTL
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Deletes a value from the store
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Enumerates live keys starting with `prefix`
    ///
    /// Keys added or expired while the stream is consumed may or may not be
    /// observed.
    fn scan_prefix<'a>(&'a self, prefix: &'a str) -> KeyStream<'a>;

    /// Checks if a key exists in the store
    async fn exists(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.get_raw(key).await?.is_some())
    }

    /// Gets the remaining TTL for a key
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError>;

    /// Returns approximate number of entries in the store
    async fn size(&self) -> Result<usize, DomainError>;
}

/// Extension trait providing typed get/set operations
pub trait CacheExt: Cache {
    /// Gets a typed value from the store
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        DomainError::cache(format!("Failed to deserialize cache value: {}", e))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value with a TTL
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync + ?Sized,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                DomainError::cache(format!("Failed to serialize cache value: {}", e))
            })?;
            self.set_raw(key, &data, ttl).await
        }
    }
}

// Blanket implementation for all types implementing Cache
impl<T: Cache + ?Sized> CacheExt for T {}
