//! Retrieval orchestration
//!
//! Cache-first answering: an approximate cache hit short-circuits the
//! vector and graph fan-out and the completion call.

mod config;
mod orchestrator;
mod payload;
mod prompt;

pub use config::{CacheMode, RetrievalConfig};
pub use orchestrator::{Answer, AnswerOrigin, RetrievalOrchestrator};
pub use payload::{truncate_chars, CachedResult, RetrievalPayload};
pub use prompt::{build_request, SYSTEM_PROMPT};
