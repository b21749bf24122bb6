//! Cache-aside answering over vector and graph retrieval

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, info, instrument, warn};

use super::{build_request, CacheMode, CachedResult, RetrievalConfig, RetrievalPayload};
use crate::domain::embedding::Embedding;
use crate::domain::graph::{GraphQuery, GraphStore};
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::retry::{with_retry, with_timeout};
use crate::domain::semantic_cache::{CacheHit, SemanticCache};
use crate::domain::vector_index::VectorIndex;
use crate::domain::DomainError;

/// Where an answer came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnswerOrigin {
    /// A cached answer to a similar earlier query
    Cache { similarity: f32 },
    /// Generated from a cached retrieval payload of a similar earlier query
    CachedContext { similarity: f32 },
    /// Generated from fresh retrieval
    Generated,
}

impl AnswerOrigin {
    pub fn is_cached(&self) -> bool {
        !matches!(self, Self::Generated)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub origin: AnswerOrigin,
}

/// Answers queries from the semantic cache, falling back to concurrent
/// vector and graph retrieval followed by a completion call
#[derive(Debug)]
pub struct RetrievalOrchestrator {
    cache: Arc<SemanticCache>,
    vector_index: Arc<dyn VectorIndex>,
    graph: Arc<dyn GraphStore>,
    llm: Arc<dyn LlmProvider>,
    config: RetrievalConfig,
}

impl RetrievalOrchestrator {
    pub fn new(
        cache: Arc<SemanticCache>,
        vector_index: Arc<dyn VectorIndex>,
        graph: Arc<dyn GraphStore>,
        llm: Arc<dyn LlmProvider>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            cache,
            vector_index,
            graph,
            llm,
            config,
        }
    }

    pub fn cache(&self) -> &SemanticCache {
        &self.cache
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Answers `query`
    ///
    /// A failing cache lookup fails the query with a `cache` retrieval error
    /// unless `degrade_on_cache_error` is set, in which case it counts as a
    /// miss. A failing cache write is logged and never fails the query.
    #[instrument(skip(self))]
    pub async fn answer(&self, query: &str) -> Result<Answer, DomainError> {
        let query = query.trim();

        if query.is_empty() {
            return Err(DomainError::validation("Query must not be empty"));
        }

        let embedding = self.embed(query).await?;

        let cached_context = match self.lookup(query, &embedding).await {
            Ok(Some(hit)) => match hit.value {
                CachedResult::Answer { text } => {
                    counter!("retrieval_answers_total", "origin" => "cache").increment(1);
                    return Ok(Answer {
                        text,
                        origin: AnswerOrigin::Cache {
                            similarity: hit.similarity,
                        },
                    });
                }
                CachedResult::Retrieval { payload } => Some((payload, hit.similarity)),
            },
            Ok(None) => None,
            Err(e) => {
                counter!("retrieval_cache_errors_total", "stage" => "lookup").increment(1);

                if !self.config.degrade_on_cache_error {
                    return Err(DomainError::retrieval("cache", e.to_string()));
                }

                warn!(error = %e, "Semantic cache lookup failed, continuing uncached");
                None
            }
        };

        if let Some((payload, similarity)) = cached_context {
            debug!(similarity, "Reusing cached retrieval payload");
            let text = self.generate(query, &payload).await?;
            counter!("retrieval_answers_total", "origin" => "cached_context").increment(1);

            return Ok(Answer {
                text,
                origin: AnswerOrigin::CachedContext { similarity },
            });
        }

        let payload = self.retrieve(query, &embedding).await?;
        let text = self.generate(query, &payload).await?;

        let cached = match self.config.cache_mode {
            CacheMode::Answer => CachedResult::Answer { text: text.clone() },
            CacheMode::Retrieval => CachedResult::Retrieval {
                payload: payload.clone(),
            },
        };

        if let Err(e) = self.cache.put(query, &payload, &cached, Some(embedding)).await {
            warn!(error = %e, "Answer generated but could not be cached");
            counter!("retrieval_cache_errors_total", "stage" => "populate").increment(1);
        }

        counter!("retrieval_answers_total", "origin" => "generated").increment(1);

        Ok(Answer {
            text,
            origin: AnswerOrigin::Generated,
        })
    }

    /// Runs the vector and graph lookups concurrently and waits for both
    pub async fn retrieve(
        &self,
        query: &str,
        embedding: &Embedding,
    ) -> Result<RetrievalPayload, DomainError> {
        let started = Instant::now();

        let vector_task = {
            let index = Arc::clone(&self.vector_index);
            let vector = embedding.vector().to_vec();
            let top_k = self.config.top_k;
            let limit = self.config.vector_timeout();
            let retry = self.config.retry.clone();

            tokio::spawn(async move {
                let (index, vector) = (&index, vector.as_slice());
                with_retry(&retry, "vector_query", move || {
                    with_timeout(limit, "vector_query", index.query(vector, top_k))
                })
                .await
            })
        };

        let graph_task = {
            let graph = Arc::clone(&self.graph);
            let request = GraphQuery::new(query)
                .with_limit(self.config.graph_fact_limit)
                .with_desc_chars(self.config.fact_desc_chars);
            let limit = self.config.graph_timeout();
            let retry = self.config.retry.clone();

            tokio::spawn(async move {
                let (graph, request) = (&graph, &request);
                with_retry(&retry, "graph_query", move || {
                    with_timeout(limit, "graph_query", graph.full_text_query(request))
                })
                .await
            })
        };

        let (vector_result, graph_result) = tokio::join!(vector_task, graph_task);

        let matches = vector_result
            .map_err(|e| DomainError::internal(format!("Vector query task failed: {}", e)))?
            .map_err(|e| DomainError::retrieval("vector_index", e.to_string()))?;
        let graph_facts = graph_result
            .map_err(|e| DomainError::internal(format!("Graph query task failed: {}", e)))?
            .map_err(|e| DomainError::retrieval("graph", e.to_string()))?;

        histogram!("retrieval_fanout_duration_seconds").record(started.elapsed().as_secs_f64());
        info!(
            matches = matches.len(),
            graph_facts = graph_facts.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Retrieved context"
        );

        Ok(RetrievalPayload::new(matches, graph_facts))
    }

    async fn lookup(
        &self,
        query: &str,
        embedding: &Embedding,
    ) -> Result<Option<CacheHit<CachedResult>>, DomainError> {
        let cache = &self.cache;

        with_retry(&self.config.retry, "cache_lookup", move || {
            cache.lookup::<CachedResult>(query, Some(embedding))
        })
        .await
    }

    async fn embed(&self, query: &str) -> Result<Embedding, DomainError> {
        let cache = &self.cache;
        let limit = self.config.embedding_timeout();

        with_retry(&self.config.retry, "embed", move || {
            with_timeout(limit, "embed", cache.embed(query))
        })
        .await
        .map_err(|e| match e {
            DomainError::Validation { .. } => e,
            other => DomainError::retrieval("embedding", other.to_string()),
        })
    }

    async fn generate(&self, query: &str, payload: &RetrievalPayload) -> Result<String, DomainError> {
        let summary = payload.context_summary(self.config.snippet_chars, self.config.context_chars);
        let request = build_request(query, payload, &summary, &self.config);

        self.complete(&request).await
    }

    async fn complete(&self, request: &LlmRequest) -> Result<String, DomainError> {
        let started = Instant::now();
        let llm = &self.llm;
        let model = self.config.chat_model.as_str();
        let limit = self.config.completion_timeout();

        let response = with_retry(&self.config.retry, "completion", move || {
            with_timeout(limit, "completion", llm.chat(model, request.clone()))
        })
        .await
        .map_err(|e| DomainError::completion(e.to_string()))?;

        histogram!("retrieval_completion_duration_seconds").record(started.elapsed().as_secs_f64());

        if let Some(ref usage) = response.usage {
            debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Completion finished"
            );
        }

        response
            .content()
            .map(str::to_string)
            .ok_or_else(|| DomainError::completion("Provider returned an empty message"))
    }
}
