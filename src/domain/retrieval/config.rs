//! Retrieval configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::retry::RetryConfig;
use crate::domain::DomainError;

/// What a cache miss stores for later queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// Cache the generated answer; hits skip retrieval and completion
    #[default]
    Answer,
    /// Cache the raw retrieval payload; hits skip retrieval only
    Retrieval,
}

/// Limits, model parameters and deadlines for answering a query
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Matches requested from the vector index
    pub top_k: u32,
    /// Maximum relationship facts returned by the graph store
    pub graph_fact_limit: u32,
    /// Characters kept from each graph target description
    pub fact_desc_chars: usize,
    /// Characters kept from each vector match text in the summary
    pub snippet_chars: usize,
    /// Overall character budget of the merged context summary
    pub context_chars: usize,
    /// Graph facts rendered in full in the prompt
    pub prompt_fact_limit: usize,
    pub chat_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub cache_mode: CacheMode,
    /// Treat a failed cache lookup as a miss instead of failing the query
    pub degrade_on_cache_error: bool,
    pub embedding_timeout_ms: u64,
    pub vector_timeout_ms: u64,
    pub graph_timeout_ms: u64,
    pub completion_timeout_ms: u64,
    pub retry: RetryConfig,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            graph_fact_limit: 30,
            fact_desc_chars: 400,
            snippet_chars: 300,
            context_chars: 2000,
            prompt_fact_limit: 20,
            chat_model: "gpt-4o-mini".to_string(),
            max_tokens: 600,
            temperature: 0.2,
            cache_mode: CacheMode::default(),
            degrade_on_cache_error: false,
            embedding_timeout_ms: 10_000,
            vector_timeout_ms: 10_000,
            graph_timeout_ms: 10_000,
            completion_timeout_ms: 60_000,
            retry: RetryConfig::default(),
        }
    }
}

impl RetrievalConfig {
    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_millis(self.embedding_timeout_ms)
    }

    pub fn vector_timeout(&self) -> Duration {
        Duration::from_millis(self.vector_timeout_ms)
    }

    pub fn graph_timeout(&self) -> Duration {
        Duration::from_millis(self.graph_timeout_ms)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_millis(self.completion_timeout_ms)
    }

    pub fn with_context_chars(mut self, chars: usize) -> Self {
        self.context_chars = chars;
        self
    }

    pub fn with_cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    pub fn with_degrade_on_cache_error(mut self, degrade: bool) -> Self {
        self.degrade_on_cache_error = degrade;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets every per-call deadline to the same value
    pub fn with_timeouts(mut self, timeout: Duration) -> Self {
        let ms = timeout.as_millis() as u64;
        self.embedding_timeout_ms = ms;
        self.vector_timeout_ms = ms;
        self.graph_timeout_ms = ms;
        self.completion_timeout_ms = ms;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.top_k == 0 {
            return Err(DomainError::configuration("retrieval.top_k must be at least 1"));
        }

        if self.chat_model.trim().is_empty() {
            return Err(DomainError::configuration("retrieval.chat_model must be set"));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(DomainError::configuration(format!(
                "retrieval.temperature must be within [0, 2], got {}",
                self.temperature
            )));
        }

        let deadlines = [
            self.embedding_timeout_ms,
            self.vector_timeout_ms,
            self.graph_timeout_ms,
            self.completion_timeout_ms,
        ];

        if deadlines.contains(&0) {
            return Err(DomainError::configuration(
                "retrieval timeouts must be greater than zero",
            ));
        }

        Ok(())
    }
}
