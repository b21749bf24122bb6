//! Embedding vectors and similarity

use serde::{Deserialize, Serialize};

/// A fixed-dimension embedding produced by an [`EmbeddingProvider`]
///
/// [`EmbeddingProvider`]: super::EmbeddingProvider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    /// Create a new embedding
    pub fn new(vector: Vec<f32>) -> Self {
        Self(vector)
    }

    /// Get the embedding vector
    pub fn vector(&self) -> &[f32] {
        &self.0
    }

    /// Get the embedding dimensions
    pub fn dimensions(&self) -> usize {
        self.0.len()
    }

    /// Consume and return the vector
    pub fn into_vector(self) -> Vec<f32> {
        self.0
    }

    /// Calculate cosine similarity with a raw vector
    pub fn cosine_similarity(&self, other: &[f32]) -> f32 {
        cosine_similarity(&self.0, other)
    }
}

impl From<Vec<f32>> for Embedding {
    fn from(vector: Vec<f32>) -> Self {
        Self(vector)
    }
}

/// Calculate cosine similarity between two vectors
///
/// Returns 0.0 for empty vectors, zero vectors and mismatched dimensions.
/// Sums are accumulated in f64 so a vector compared with itself yields
/// exactly 1.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b.iter()).fold(
        (0.0f64, 0.0f64, 0.0f64),
        |(dot, na, nb), (&x, &y)| {
            let (x, y) = (x as f64, y as f64);
            (dot + x * y, na + x * x, nb + y * y)
        },
    );

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b).sqrt()).clamp(-1.0, 1.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_creation() {
        let emb = Embedding::new(vec![0.1, 0.2, 0.3]);

        assert_eq!(emb.dimensions(), 3);
        assert_eq!(emb.vector(), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];

        assert_eq!(cosine_similarity(&a, &b), 1.0);
    }

    #[test]
    fn test_cosine_similarity_self_is_exactly_one() {
        let a = vec![0.013, -0.271, 0.5559, 0.0042, -0.91, 0.3333];

        assert_eq!(cosine_similarity(&a, &a), 1.0);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];

        let similarity = cosine_similarity(&a, &b);

        assert!(similarity.abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![-1.0, 0.0, 0.0];

        let similarity = cosine_similarity(&a, &b);

        assert!((similarity + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_embedding_cosine_similarity() {
        let emb = Embedding::new(vec![1.0, 0.0]);

        let similarity = emb.cosine_similarity(&[0.707, 0.707]);

        assert!(similarity > 0.7 && similarity < 0.72);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_cosine_similarity_different_lengths() {
        let a = vec![1.0, 2.0];
        let b = vec![1.0, 2.0, 3.0];

        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn test_embedding_serializes_as_plain_array() {
        let emb = Embedding::new(vec![0.5, -0.25]);

        assert_eq!(serde_json::to_string(&emb).unwrap(), "[0.5,-0.25]");
    }
}
