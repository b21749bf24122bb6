//! OpenAI embeddings provider

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{DomainError, Embedding, EmbeddingProvider};
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Known OpenAI embedding models and their output dimensions
const EMBEDDING_MODELS: &[(&str, usize)] = &[
    ("text-embedding-3-small", 1536),
    ("text-embedding-3-large", 3072),
    ("text-embedding-ada-002", 1536),
];

/// OpenAI embedding provider
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Output dimensions of a known model
    pub fn dimensions(model: &str) -> Option<usize> {
        EMBEDDING_MODELS
            .iter()
            .find(|(name, _)| *name == model)
            .map(|(_, dims)| *dims)
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        if text.trim().is_empty() {
            return Err(DomainError::validation("Cannot embed empty text"));
        }

        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });

        let json = self
            .client
            .post_json(&self.embeddings_url(), self.headers(), &body)
            .await?;

        let response: OpenAiEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse embedding response: {}", e))
        })?;

        let data = response
            .data
            .into_iter()
            .min_by_key(|d| d.index)
            .ok_or_else(|| DomainError::provider("openai", "No embedding in response"))?;

        if data.embedding.is_empty() {
            return Err(DomainError::provider("openai", "Empty embedding vector"));
        }

        Ok(Embedding::new(data.embedding))
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    const TEST_URL: &str = "https://api.openai.com/v1/embeddings";

    fn create_mock_response(dimensions: usize) -> serde_json::Value {
        let embedding: Vec<f32> = (0..dimensions).map(|j| j as f32 * 0.001).collect();

        serde_json::json!({
            "model": "text-embedding-3-small",
            "data": [{ "index": 0, "embedding": embedding, "object": "embedding" }],
            "usage": { "prompt_tokens": 10, "total_tokens": 10 }
        })
    }

    #[tokio::test]
    async fn test_embed_single_text() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(1536));
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let embedding = provider.embed("best beaches in Thailand").await.unwrap();

        assert_eq!(embedding.dimensions(), 1536);

        let sent = provider.client.last_request().unwrap();
        assert_eq!(sent.body["model"], "text-embedding-3-small");
        assert_eq!(sent.body["input"], "best beaches in Thailand");
        assert_eq!(sent.header("Authorization"), Some("Bearer test-api-key"));
    }

    #[tokio::test]
    async fn test_embed_with_custom_model() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(8));
        let provider =
            OpenAiEmbeddingProvider::new(client, "k").with_model("text-embedding-3-large");

        provider.embed("Hello").await.unwrap();

        assert_eq!(provider.model(), "text-embedding-3-large");
        assert_eq!(
            provider.client.last_request().unwrap().body["model"],
            "text-embedding-3-large"
        );
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_without_request() {
        let provider = OpenAiEmbeddingProvider::new(MockHttpClient::new(), "k");

        let result = provider.embed("   ").await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert!(provider.client.requests().is_empty());
    }

    #[tokio::test]
    async fn test_embed_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "Rate limit exceeded");
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let result = provider.embed("Hello").await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
    }

    #[tokio::test]
    async fn test_missing_data_is_an_error() {
        let client = MockHttpClient::new()
            .with_response(TEST_URL, serde_json::json!({ "data": [] }));
        let provider = OpenAiEmbeddingProvider::new(client, "k");

        assert!(provider.embed("Hello").await.is_err());
    }

    #[tokio::test]
    async fn test_custom_base_url() {
        let custom_url = "http://localhost:8080/v1/embeddings";
        let client = MockHttpClient::new().with_response(custom_url, create_mock_response(4));
        let provider =
            OpenAiEmbeddingProvider::with_base_url(client, "test-key", "http://localhost:8080");

        let embedding = provider.embed("Test").await.unwrap();

        assert_eq!(embedding.dimensions(), 4);
    }

    #[test]
    fn test_provider_info() {
        let provider = OpenAiEmbeddingProvider::new(MockHttpClient::new(), "test-key");

        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.model(), "text-embedding-3-small");
        assert_eq!(
            OpenAiEmbeddingProvider::<MockHttpClient>::dimensions("text-embedding-3-large"),
            Some(3072)
        );
        assert_eq!(
            OpenAiEmbeddingProvider::<MockHttpClient>::dimensions("unknown-model"),
            None
        );
    }
}
