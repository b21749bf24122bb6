//! Approximate-match cache over an expiring key-value store

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::TryStreamExt;
use metrics::{counter, histogram};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{CacheHit, QueryMetadata, SemanticCacheConfig, SemanticCacheStats, SimilarMatch};
use crate::domain::cache::{Cache, CacheKey};
use crate::domain::embedding::{cosine_similarity, Embedding, EmbeddingProvider};
use crate::domain::retry::with_retry;
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Counters {
    lookups: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    orphaned: AtomicU64,
    malformed: AtomicU64,
    puts: AtomicU64,
    put_failures: AtomicU64,
}

fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

/// Semantic cache
///
/// Lookups scan every live metadata entry, so cost grows with the number of
/// cached queries times the embedding dimension.
#[derive(Debug)]
pub struct SemanticCache {
    store: Arc<dyn Cache>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: SemanticCacheConfig,
    counters: Counters,
}

impl SemanticCache {
    pub fn new(
        store: Arc<dyn Cache>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: SemanticCacheConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
            counters: Counters::default(),
        }
    }

    pub fn config(&self) -> &SemanticCacheConfig {
        &self.config
    }

    /// Embeds a query with the configured provider
    pub async fn embed(&self, query: &str) -> Result<Embedding, DomainError> {
        if query.trim().is_empty() {
            return Err(DomainError::validation("Cannot embed an empty query"));
        }

        self.embedder.embed(query).await
    }

    /// Stores `result` under the digest of `(query, context)` and records the
    /// query embedding in the metadata namespace
    ///
    /// The two writes are independent, each retried on transient errors. The
    /// metadata write is skipped when the result write fails, so a failed put
    /// never leaves a metadata entry pointing at nothing.
    pub async fn put<C, V>(
        &self,
        query: &str,
        context: &C,
        result: &V,
        embedding: Option<Embedding>,
    ) -> Result<CacheKey, DomainError>
    where
        C: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        let outcome = self.try_put(query, context, result, embedding).await;

        match &outcome {
            Ok(key) => {
                bump(&self.counters.puts);
                counter!("semantic_cache_puts_total", "status" => "ok").increment(1);
                debug!(key = %key, query, "Stored semantic cache entry");
            }
            Err(e) => {
                bump(&self.counters.put_failures);
                counter!("semantic_cache_puts_total", "status" => "error").increment(1);
                warn!(query, error = %e, "Failed to store semantic cache entry");
            }
        }

        outcome
    }

    async fn try_put<C, V>(
        &self,
        query: &str,
        context: &C,
        result: &V,
        embedding: Option<Embedding>,
    ) -> Result<CacheKey, DomainError>
    where
        C: Serialize + ?Sized,
        V: Serialize + ?Sized,
    {
        if query.trim().is_empty() {
            return Err(DomainError::validation("Cannot cache an empty query"));
        }

        let key = CacheKey::derive(query, context)?;
        let ttl = self.config.ttl();
        let store = &self.store;

        let value = serde_json::to_string(result).map_err(|e| {
            DomainError::cache(format!("Failed to serialize cache value: {}", e))
        })?;
        let result_key = key.as_str();
        let value = value.as_str();

        with_retry(&self.config.retry, "cache_result_write", move || {
            store.set_raw(result_key, value, ttl)
        })
        .await?;

        let embedding = match embedding {
            Some(embedding) => embedding,
            None => self.embed(query).await?,
        };

        let metadata = QueryMetadata {
            query: query.to_string(),
            embedding: Some(embedding.into_vector()),
        };
        let metadata = serde_json::to_string(&metadata).map_err(|e| {
            DomainError::cache(format!("Failed to serialize query metadata: {}", e))
        })?;
        let metadata_key = key.namespaced(&self.config.metadata_prefix);
        let (metadata_key, metadata) = (metadata_key.as_str(), metadata.as_str());

        with_retry(&self.config.retry, "cache_metadata_write", move || {
            store.set_raw(metadata_key, metadata, ttl)
        })
        .await?;

        Ok(key)
    }

    /// Returns the cached result of the most similar earlier query, if any
    /// clears the threshold and its result entry is still readable
    pub async fn get_approx<V>(
        &self,
        query: &str,
        embedding: Option<&Embedding>,
    ) -> Result<Option<V>, DomainError>
    where
        V: DeserializeOwned,
    {
        Ok(self.lookup(query, embedding).await?.map(|hit| hit.value))
    }

    /// Same as [`get_approx`](Self::get_approx) but reports which entry
    /// matched and how closely
    pub async fn lookup<V>(
        &self,
        query: &str,
        embedding: Option<&Embedding>,
    ) -> Result<Option<CacheHit<V>>, DomainError>
    where
        V: DeserializeOwned,
    {
        let computed;
        let embedding = match embedding {
            Some(embedding) => embedding,
            None => {
                computed = self.embed(query).await?;
                &computed
            }
        };

        bump(&self.counters.lookups);

        let Some(best) = self.find_best_match(embedding.vector()).await? else {
            self.record_miss(query, "no_match");
            return Ok(None);
        };

        // No fallback to the next-best candidate when the result is gone
        let raw = match self.store.get_raw(best.key.as_str()).await? {
            Some(raw) => raw,
            None => {
                bump(&self.counters.orphaned);
                debug!(
                    key = %best.key,
                    similarity = best.similarity,
                    "Matched metadata has no live result entry"
                );
                self.record_miss(query, "orphaned");
                return Ok(None);
            }
        };

        let value = match serde_json::from_str::<V>(&raw) {
            Ok(value) => value,
            Err(e) => {
                bump(&self.counters.orphaned);
                warn!(key = %best.key, error = %e, "Cached result could not be decoded");
                self.record_miss(query, "undecodable");
                return Ok(None);
            }
        };

        bump(&self.counters.hits);
        counter!("semantic_cache_lookups_total", "outcome" => "hit").increment(1);
        histogram!("semantic_cache_hit_similarity").record(best.similarity as f64);
        info!(
            query,
            matched_query = %best.query,
            similarity = best.similarity,
            "Semantic cache hit"
        );

        Ok(Some(CacheHit {
            value,
            key: best.key,
            matched_query: best.query,
            similarity: best.similarity,
        }))
    }

    /// Scans the metadata namespace for the most similar query embedding
    ///
    /// A candidate must reach the threshold and strictly beat the best seen so
    /// far, so the first of several equal candidates wins.
    pub async fn find_best_match(
        &self,
        embedding: &[f32],
    ) -> Result<Option<SimilarMatch>, DomainError> {
        let started = Instant::now();
        let threshold = self.config.threshold();
        let prefix = self.config.metadata_prefix.as_str();

        let mut keys = self.store.scan_prefix(prefix);
        let mut best: Option<SimilarMatch> = None;
        let mut scanned = 0u64;

        while let Some(meta_key) = keys.try_next().await? {
            let Some(key) = CacheKey::from_namespaced(prefix, &meta_key) else {
                continue;
            };

            // Expired between enumeration and read
            let Some(raw) = self.store.get_raw(&meta_key).await? else {
                continue;
            };

            scanned += 1;

            let metadata: QueryMetadata = match serde_json::from_str(&raw) {
                Ok(metadata) => metadata,
                Err(e) => {
                    bump(&self.counters.malformed);
                    warn!(key = %meta_key, error = %e, "Skipping malformed query metadata");
                    continue;
                }
            };

            let Some(candidate) = metadata.embedding.as_deref() else {
                continue;
            };

            let similarity = cosine_similarity(embedding, candidate);

            if similarity >= threshold && best.as_ref().is_none_or(|b| similarity > b.similarity) {
                best = Some(SimilarMatch {
                    key,
                    query: metadata.query,
                    similarity,
                });
            }
        }

        histogram!("semantic_cache_scan_entries").record(scanned as f64);
        histogram!("semantic_cache_scan_duration_seconds").record(started.elapsed().as_secs_f64());
        debug!(
            scanned,
            best_similarity = best.as_ref().map(|b| b.similarity),
            threshold,
            "Scanned query metadata"
        );

        Ok(best)
    }

    /// Get a snapshot of the lookup counters
    pub fn stats(&self) -> SemanticCacheStats {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);

        SemanticCacheStats {
            lookups: load(&self.counters.lookups),
            hits: load(&self.counters.hits),
            misses: load(&self.counters.misses),
            orphaned: load(&self.counters.orphaned),
            malformed: load(&self.counters.malformed),
            puts: load(&self.counters.puts),
            put_failures: load(&self.counters.put_failures),
        }
    }

    fn record_miss(&self, query: &str, reason: &'static str) {
        bump(&self.counters.misses);
        counter!("semantic_cache_lookups_total", "outcome" => reason).increment(1);
        debug!(query, reason, "Semantic cache miss");
    }
}
