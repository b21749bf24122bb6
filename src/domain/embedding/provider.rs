//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use super::Embedding;
use crate::domain::DomainError;

/// Trait for embedding providers (OpenAI, etc.)
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate the embedding for a non-empty text
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;

    /// Get the model used to produce embeddings
    fn model(&self) -> &str;
}
