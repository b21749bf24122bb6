//! Semantic cache configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::retry::RetryConfig;
use crate::domain::DomainError;

/// Configuration for semantic caching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticCacheConfig {
    /// Minimum cosine similarity for a hit (0.0 to 1.0)
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Time-to-live applied to both the result and metadata entries
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Key prefix of the metadata namespace
    #[serde(default = "default_metadata_prefix")]
    pub metadata_prefix: String,

    /// Embedding model to use
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Retry policy for store writes
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_similarity_threshold() -> f32 {
    0.7
}

fn default_ttl_secs() -> u64 {
    86400
}

fn default_metadata_prefix() -> String {
    "meta:".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            ttl_secs: default_ttl_secs(),
            metadata_prefix: default_metadata_prefix(),
            embedding_model: default_embedding_model(),
            retry: RetryConfig::default(),
        }
    }
}

impl SemanticCacheConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get TTL as Duration
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Threshold clamped into [0, 1]
    pub fn threshold(&self) -> f32 {
        self.similarity_threshold.clamp(0.0, 1.0)
    }

    /// Set the similarity threshold
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_secs = ttl.as_secs();
        self
    }

    /// Set the metadata key prefix
    pub fn with_metadata_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.metadata_prefix = prefix.into();
        self
    }

    /// Set the embedding model
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set the retry policy for store writes
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.metadata_prefix.is_empty() {
            return Err(DomainError::configuration(
                "semantic_cache.metadata_prefix must not be empty",
            ));
        }

        if self.ttl_secs == 0 {
            return Err(DomainError::configuration(
                "semantic_cache.ttl_secs must be greater than zero",
            ));
        }

        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(DomainError::configuration(format!(
                "semantic_cache.similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }

        Ok(())
    }
}
