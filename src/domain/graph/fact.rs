//! Relationship facts returned by the graph store

use serde::{Deserialize, Serialize};

/// One `(source)-[relation]->(target)` triple with target attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphFact {
    pub source: String,
    pub relation: String,
    pub target_id: String,
    #[serde(default)]
    pub target_name: Option<String>,
    #[serde(default)]
    pub target_desc: String,
    #[serde(default)]
    pub target_type: Option<String>,
}

impl GraphFact {
    pub fn new(
        source: impl Into<String>,
        relation: impl Into<String>,
        target_id: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            relation: relation.into(),
            target_id: target_id.into(),
            target_name: None,
            target_desc: String::new(),
            target_type: None,
        }
    }

    pub fn with_target_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }

    pub fn with_target_desc(mut self, desc: impl Into<String>) -> Self {
        self.target_desc = desc.into();
        self
    }

    pub fn with_target_type(mut self, target_type: impl Into<String>) -> Self {
        self.target_type = Some(target_type.into());
        self
    }

    /// Keeps at most `max_chars` characters of the target description
    pub fn truncate_desc(mut self, max_chars: usize) -> Self {
        if let Some((idx, _)) = self.target_desc.char_indices().nth(max_chars) {
            self.target_desc.truncate(idx);
        }
        self
    }

    /// Target label, falling back to the id for unnamed nodes
    pub fn target_label(&self) -> &str {
        self.target_name.as_deref().unwrap_or(&self.target_id)
    }

    /// Compact rendering used in the merged context summary
    pub fn summary_line(&self) -> String {
        format!("{} -[{}]-> {}", self.source, self.relation, self.target_label())
    }

    /// Full rendering used in the prompt's relationship section
    pub fn detail_line(&self) -> String {
        format!(
            "- ({}) -[{}]-> ({}) {}: {}",
            self.source,
            self.relation,
            self.target_id,
            self.target_name.as_deref().unwrap_or(""),
            self.target_desc
        )
    }
}
