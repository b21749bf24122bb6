//! Vector index trait definition

use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainError;

/// A ranked match returned by the vector index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    /// Ordered so the serialized form is stable across calls
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl VectorMatch {
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// The indexed passage text, if the match carries one
    pub fn text(&self) -> Option<&str> {
        self.metadata.get("text").and_then(Value::as_str)
    }
}

/// Trait for vector similarity indexes (Pinecone, etc.)
#[async_trait]
pub trait VectorIndex: Send + Sync + Debug {
    /// Returns up to `top_k` matches ranked by similarity to `vector`
    async fn query(&self, vector: &[f32], top_k: u32) -> Result<Vec<VectorMatch>, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_text() {
        let m = VectorMatch::new("doc-1", 0.91).with_metadata("text", json!("Railay Beach"));

        assert_eq!(m.text(), Some("Railay Beach"));
        assert_eq!(VectorMatch::new("doc-2", 0.5).text(), None);
    }

    #[test]
    fn test_metadata_serializes_in_key_order() {
        let m = VectorMatch::new("a", 1.0)
            .with_metadata("z", json!(1))
            .with_metadata("b", json!(2));

        let json = serde_json::to_string(&m).unwrap();

        assert!(json.find("\"b\"").unwrap() < json.find("\"z\"").unwrap());
    }
}
