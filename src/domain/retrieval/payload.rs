//! Raw retrieval results and what gets cached

use serde::{Deserialize, Serialize};

use crate::domain::graph::GraphFact;
use crate::domain::vector_index::VectorMatch;

/// Unmerged output of the vector and graph lookups for one query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalPayload {
    pub matches: Vec<VectorMatch>,
    pub graph_facts: Vec<GraphFact>,
}

impl RetrievalPayload {
    pub fn new(matches: Vec<VectorMatch>, graph_facts: Vec<GraphFact>) -> Self {
        Self {
            matches,
            graph_facts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.graph_facts.is_empty()
    }

    /// Merges match snippets and fact lines into one bounded block of text
    ///
    /// Each match contributes at most `snippet_chars` characters of its text;
    /// the joined result is cut to `max_chars` characters.
    pub fn context_summary(&self, snippet_chars: usize, max_chars: usize) -> String {
        let snippets = self
            .matches
            .iter()
            .filter_map(|m| m.text())
            .map(|text| truncate_chars(text, snippet_chars).to_string());
        let facts = self.graph_facts.iter().map(GraphFact::summary_line);

        let combined = snippets.chain(facts).collect::<Vec<_>>().join("\n");

        truncate_chars(&combined, max_chars).to_string()
    }
}

/// Prefix of `text` holding at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Value stored in the semantic cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CachedResult {
    Answer { text: String },
    Retrieval { payload: RetrievalPayload },
}
