//! Domain layer - Core business logic and entities

pub mod cache;
pub mod embedding;
pub mod error;
pub mod graph;
pub mod llm;
pub mod retrieval;
pub mod retry;
pub mod semantic_cache;
pub mod vector_index;

pub use cache::{Cache, CacheExt, CacheKey, KeyStream};
pub use embedding::{cosine_similarity, Embedding, EmbeddingProvider};
pub use error::DomainError;
pub use graph::{GraphFact, GraphQuery, GraphStore};
pub use llm::{LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, Message, MessageRole, Usage};
pub use retrieval::{
    Answer, AnswerOrigin, CacheMode, CachedResult, RetrievalConfig, RetrievalOrchestrator,
    RetrievalPayload,
};
pub use retry::RetryConfig;
pub use semantic_cache::{
    CacheHit, QueryMetadata, SemanticCache, SemanticCacheConfig, SemanticCacheStats, SimilarMatch,
};
pub use vector_index::{VectorIndex, VectorMatch};
