//! Digest keys for cached results

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::DomainError;

/// Separates the query from the serialized context inside the digest input.
/// JSON output escapes control characters, so it never occurs in the context.
const FIELD_SEPARATOR: u8 = 0x1f;

/// Fixed-length digest identifying one `(query, context)` pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for a query and the raw retrieval context it was
    /// answered from
    pub fn derive<C: Serialize + ?Sized>(query: &str, context: &C) -> Result<Self, DomainError> {
        let context_json = serde_json::to_string(context).map_err(|e| {
            DomainError::internal(format!("Failed to serialize cache key context: {}", e))
        })?;

        Ok(Self::from_parts(query, &context_json))
    }

    fn from_parts(query: &str, context_json: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(query.as_bytes());
        hasher.update([FIELD_SEPARATOR]);
        hasher.update(context_json.as_bytes());

        Self(hex::encode(hasher.finalize()))
    }

    /// Recovers the digest from a namespaced key such as `meta:<digest>`
    pub fn from_namespaced(namespace: &str, key: &str) -> Option<Self> {
        key.strip_prefix(namespace)
            .filter(|digest| !digest.is_empty())
            .map(|digest| Self(digest.to_string()))
    }

    /// Key under `namespace`, e.g. the metadata entry paired with this result
    pub fn namespaced(&self, namespace: &str) -> String {
        format!("{}{}", namespace, self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_derive_is_deterministic() {
        let context = json!({"matches": [{"id": "a"}], "graph_facts": []});

        let first = CacheKey::derive("best beaches in Thailand", &context).unwrap();
        let second = CacheKey::derive("best beaches in Thailand", &context).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_key_is_fixed_length_hex() {
        let key = CacheKey::derive("query", &json!(null)).unwrap();

        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_changing_query_or_context_changes_key() {
        let base = CacheKey::derive("hanoi food", &json!({"n": 1})).unwrap();

        assert_ne!(base, CacheKey::derive("hanoi food!", &json!({"n": 1})).unwrap());
        assert_ne!(base, CacheKey::derive("hanoi food", &json!({"n": 2})).unwrap());
    }

    #[test]
    fn test_boundary_between_query_and_context_is_unambiguous() {
        let left = CacheKey::derive("ab", "c").unwrap();
        let right = CacheKey::derive("a", "bc").unwrap();

        assert_ne!(left, right);
    }

    #[test]
    fn test_namespaced_round_trip() {
        let key = CacheKey::derive("q", &json!([1, 2])).unwrap();
        let meta_key = key.namespaced("meta:");

        assert!(meta_key.starts_with("meta:"));
        assert_eq!(CacheKey::from_namespaced("meta:", &meta_key), Some(key));
    }

    #[test]
    fn test_from_namespaced_rejects_foreign_keys() {
        assert_eq!(CacheKey::from_namespaced("meta:", "other:abc"), None);
        assert_eq!(CacheKey::from_namespaced("meta:", "meta:"), None);
    }
}
