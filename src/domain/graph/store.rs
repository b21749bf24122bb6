//! Graph store trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use super::GraphFact;
use crate::domain::DomainError;

/// Full-text relationship lookup
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQuery {
    pub text: String,
    /// Maximum number of facts returned
    pub limit: u32,
    /// Maximum characters kept from each target description
    pub desc_chars: usize,
}

impl GraphQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            limit: 30,
            desc_chars: 400,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_desc_chars(mut self, desc_chars: usize) -> Self {
        self.desc_chars = desc_chars;
        self
    }
}

/// Trait for graph databases (Neo4j, etc.)
#[async_trait]
pub trait GraphStore: Send + Sync + Debug {
    /// Runs a full-text query and returns the relationships of matching
    /// nodes, at most `query.limit` of them
    async fn full_text_query(&self, query: &GraphQuery) -> Result<Vec<GraphFact>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    #[derive(Debug, Default)]
    pub struct MockGraphStore {
        facts: Vec<GraphFact>,
        error: Option<String>,
        delay: Option<Duration>,
        calls: AtomicUsize,
        call_log: Option<Arc<Mutex<Vec<&'static str>>>>,
    }

    impl MockGraphStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_facts(mut self, facts: Vec<GraphFact>) -> Self {
            self.facts = facts;
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn with_call_log(mut self, log: Arc<Mutex<Vec<&'static str>>>) -> Self {
            self.call_log = Some(log);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GraphStore for MockGraphStore {
        async fn full_text_query(&self, query: &GraphQuery) -> Result<Vec<GraphFact>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            if let Some(ref log) = self.call_log {
                log.lock().unwrap().push("graph");
            }

            if let Some(ref error) = self.error {
                return Err(DomainError::retrieval("mock", error.clone()));
            }

            Ok(self
                .facts
                .iter()
                .take(query.limit as usize)
                .cloned()
                .map(|f| f.truncate_desc(query.desc_chars))
                .collect())
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
