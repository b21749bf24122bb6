//! Semantic cache records

use serde::{Deserialize, Serialize};

use crate::domain::cache::CacheKey;

/// Stored under `<metadata_prefix><digest>` alongside each result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryMetadata {
    pub query: String,
    /// Entries written without an embedding are never matched
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

/// Best metadata candidate found by a scan
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarMatch {
    pub key: CacheKey,
    pub query: String,
    pub similarity: f32,
}

/// A resolved approximate hit
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit<V> {
    pub value: V,
    pub key: CacheKey,
    /// Query text the cached result was produced for
    pub matched_query: String,
    pub similarity: f32,
}

/// Statistics for the semantic cache
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticCacheStats {
    pub lookups: u64,
    pub hits: u64,
    pub misses: u64,
    /// Matches whose result entry was missing or unreadable
    pub orphaned: u64,
    /// Metadata entries skipped because they failed to deserialize
    pub malformed: u64,
    pub puts: u64,
    pub put_failures: u64,
}

impl SemanticCacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;

        if total == 0 {
            return 0.0;
        }

        self.hits as f32 / total as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate() {
        let stats = SemanticCacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };

        assert_eq!(stats.hit_rate(), 0.75);
        assert_eq!(SemanticCacheStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_metadata_without_embedding_deserializes() {
        let metadata: QueryMetadata = serde_json::from_str(r#"{"query": "hue"}"#).unwrap();

        assert_eq!(metadata.query, "hue");
        assert_eq!(metadata.embedding, None);
    }
}
