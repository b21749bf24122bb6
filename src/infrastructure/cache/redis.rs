//! Redis store implementation

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::{stream, TryStreamExt};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use crate::domain::cache::{Cache, KeyStream};
use crate::domain::DomainError;

/// Keys requested per SCAN round trip
const SCAN_COUNT: usize = 200;

/// Configuration for Redis store
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Key prefix for namespacing
    pub key_prefix: Option<String>,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: None,
        }
    }
}

impl RedisCacheConfig {
    /// Creates a new configuration with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
}

/// Escapes Redis glob metacharacters so `text` matches literally
fn glob_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

/// Redis store implementation
///
/// Uses `SET EX` for writes and cursor-based `SCAN MATCH` for prefix
/// enumeration, one page per round trip.
#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
    config: RedisCacheConfig,
}

impl fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisCache")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisCache {
    /// Creates a new Redis connection
    pub async fn new(config: RedisCacheConfig) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::cache(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection, config })
    }

    fn prefix_key(&self, key: &str) -> String {
        match &self.config.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    fn unprefix_key(&self, key: String) -> String {
        match &self.config.key_prefix {
            Some(prefix) => key
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .map(str::to_string)
                .unwrap_or(key),
            None => key,
        }
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let result: Option<String> = conn.get(&prefixed_key).await.map_err(|e| {
            DomainError::cache(format!("Failed to get key '{}': {}", key, e))
        })?;

        Ok(result)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let ttl_secs = ttl.as_secs().max(1);

        let _: () = conn
            .set_ex(&prefixed_key, value, ttl_secs)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to set key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let deleted: i32 = conn.del(&prefixed_key).await.map_err(|e| {
            DomainError::cache(format!("Failed to delete key '{}': {}", key, e))
        })?;

        Ok(deleted > 0)
    }

    fn scan_prefix<'a>(&'a self, prefix: &'a str) -> KeyStream<'a> {
        let pattern = format!("{}*", glob_escape(&self.prefix_key(prefix)));
        let conn = self.connection.clone();

        let pages = stream::try_unfold((conn, Some(0u64)), move |(mut conn, cursor)| {
            let pattern = pattern.clone();

            async move {
                let Some(cursor) = cursor else {
                    return Ok::<_, DomainError>(None);
                };

                let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                    .arg(cursor)
                    .arg("MATCH")
                    .arg(&pattern)
                    .arg("COUNT")
                    .arg(SCAN_COUNT)
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| {
                        DomainError::cache(format!("Failed to scan keys with pattern '{}': {}", pattern, e))
                    })?;

                let next = (next != 0).then_some(next);
                Ok(Some((keys, (conn, next))))
            }
        });

        Box::pin(
            pages
                .map_ok(move |keys| {
                    stream::iter(keys.into_iter().map(move |key| Ok::<_, DomainError>(self.unprefix_key(key))))
                })
                .try_flatten(),
        )
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, DomainError> {
        let prefixed_key = self.prefix_key(key);
        let mut conn = self.connection.clone();

        let ttl_secs: i64 = conn.ttl(&prefixed_key).await.map_err(|e| {
            DomainError::cache(format!("Failed to get TTL for key '{}': {}", key, e))
        })?;

        // Redis returns -2 if key doesn't exist, -1 if no TTL
        if ttl_secs < 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_secs(ttl_secs as u64)))
        }
    }

    async fn size(&self) -> Result<usize, DomainError> {
        if self.config.key_prefix.is_some() {
            return self
                .scan_prefix("")
                .try_fold(0usize, |count, _| async move { Ok(count + 1) })
                .await;
        }

        let mut conn = self.connection.clone();
        let size: usize = redis::cmd("DBSIZE")
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to get database size: {}", e)))?;

        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests require a running Redis instance
    // Run with: cargo test -- --ignored

    fn get_test_config() -> RedisCacheConfig {
        RedisCacheConfig::new("redis://127.0.0.1:6379").with_key_prefix("hybrid-rag-test")
    }

    #[test]
    fn test_glob_escape() {
        assert_eq!(glob_escape("meta:"), "meta:");
        assert_eq!(glob_escape("a*b?[c]\\"), "a\\*b\\?\\[c\\]\\\\");
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_set_and_get() {
        let cache = RedisCache::new(get_test_config()).await.unwrap();

        cache
            .set_raw("key1", "\"value1\"", Duration::from_secs(60))
            .await
            .unwrap();

        let result = cache.get_raw("key1").await.unwrap();
        assert_eq!(result, Some("\"value1\"".to_string()));

        cache.delete("key1").await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_ttl() {
        let cache = RedisCache::new(get_test_config()).await.unwrap();

        cache
            .set_raw("ttl_key", "1", Duration::from_secs(60))
            .await
            .unwrap();

        let ttl = cache.ttl("ttl_key").await.unwrap();
        assert!(ttl.unwrap().as_secs() > 50);

        cache.delete("ttl_key").await.unwrap();
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_scan_prefix_strips_namespace() {
        let cache = RedisCache::new(get_test_config()).await.unwrap();
        let ttl = Duration::from_secs(60);

        cache.set_raw("meta:scan1", "1", ttl).await.unwrap();
        cache.set_raw("meta:scan2", "2", ttl).await.unwrap();
        cache.set_raw("scan3", "3", ttl).await.unwrap();

        let mut keys: Vec<String> = cache.scan_prefix("meta:scan").try_collect().await.unwrap();
        keys.sort();

        assert_eq!(keys, vec!["meta:scan1".to_string(), "meta:scan2".to_string()]);

        for key in ["meta:scan1", "meta:scan2", "scan3"] {
            cache.delete(key).await.unwrap();
        }
    }
}
