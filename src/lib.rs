//! Hybrid RAG
//!
//! Answers natural-language questions over a travel knowledge base by
//! combining:
//! - Vector similarity search (Pinecone)
//! - Graph relationship lookup (Neo4j full-text index)
//! - Chat completion grounded in both (OpenAI)
//! - A semantic cache that reuses answers for similar earlier questions

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use domain::{Cache, GraphStore, RetrievalOrchestrator, SemanticCache};
use infrastructure::{
    cache::StoreFactory,
    embedding::OpenAiEmbeddingProvider,
    graph::Neo4jGraphStore,
    llm::OpenAiProvider,
    vector_index::PineconeIndex,
    HttpClient,
};
use tracing::info;

/// Connects every backend named in `config` and assembles the orchestrator
pub async fn create_orchestrator(config: &AppConfig) -> anyhow::Result<RetrievalOrchestrator> {
    config.validate()?;

    let store = StoreFactory::create(&config.store).await?;
    let graph: Arc<dyn GraphStore> = Arc::new(Neo4jGraphStore::connect(&config.neo4j).await?);

    create_orchestrator_with(config, store, graph)
}

/// Assembles the orchestrator around an existing store and graph
///
/// The HTTP-backed adapters are built here; none of them opens a
/// connection until first use.
pub fn create_orchestrator_with(
    config: &AppConfig,
    store: Arc<dyn Cache>,
    graph: Arc<dyn GraphStore>,
) -> anyhow::Result<RetrievalOrchestrator> {
    let http = HttpClient::with_timeout(Duration::from_secs(config.openai.request_timeout_secs))?;

    let embedder = Arc::new(
        OpenAiEmbeddingProvider::with_base_url(
            http.clone(),
            config.openai.api_key.clone(),
            config.openai.base_url.clone(),
        )
        .with_model(config.semantic_cache.embedding_model.clone()),
    );
    let llm = Arc::new(OpenAiProvider::with_base_url(
        http.clone(),
        config.openai.api_key.clone(),
        config.openai.base_url.clone(),
    ));
    let vector_index = Arc::new(PineconeIndex::new(http, &config.pinecone));

    let cache = Arc::new(SemanticCache::new(
        store,
        embedder,
        config.semantic_cache.clone(),
    ));

    info!(
        store = %config.store.backend,
        chat_model = %config.retrieval.chat_model,
        cache_mode = ?config.retrieval.cache_mode,
        "Retrieval pipeline ready"
    );

    Ok(RetrievalOrchestrator::new(
        cache,
        vector_index,
        graph,
        llm,
        config.retrieval.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::MockGraphStore;
    use crate::infrastructure::cache::InMemoryCache;
    use crate::infrastructure::vector_index::PineconeConfig;

    #[tokio::test]
    async fn test_create_orchestrator_with_carries_config() {
        let mut config = AppConfig::default();
        config.openai.api_key = "sk-test".to_string();
        config.pinecone = PineconeConfig::new("pc", "travel.svc.pinecone.io");
        config.semantic_cache.similarity_threshold = 0.9;
        config.retrieval.top_k = 7;

        let orchestrator = create_orchestrator_with(
            &config,
            Arc::new(InMemoryCache::new()),
            Arc::new(MockGraphStore::new()),
        )
        .unwrap();

        assert_eq!(orchestrator.config().top_k, 7);
        assert_eq!(orchestrator.cache().config().similarity_threshold, 0.9);
    }

    #[tokio::test]
    async fn test_create_orchestrator_rejects_missing_credentials() {
        let result = create_orchestrator(&AppConfig::default()).await;

        assert!(result.is_err());
    }
}
