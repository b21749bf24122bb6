//! Semantic cache domain models and service
//!
//! Matches semantically similar queries rather than requiring exact key
//! matches. Results live under bare digest keys; the query text and its
//! embedding live under a prefixed metadata key with the same digest.

mod cache;
mod config;
mod entry;

pub use cache::SemanticCache;
pub use config::SemanticCacheConfig;
pub use entry::{CacheHit, QueryMetadata, SemanticCacheStats, SimilarMatch};
