//! Pinecone data-plane query adapter

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::{DomainError, VectorIndex, VectorMatch};
use crate::infrastructure::http_client::HttpClientTrait;

/// Connection settings for one Pinecone index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeConfig {
    pub api_key: String,
    /// Index host, e.g. `https://travel-abc123.svc.us-east1-gcp.pinecone.io`
    pub index_host: String,
    /// Optional namespace inside the index
    pub namespace: Option<String>,
}

impl PineconeConfig {
    pub fn new(api_key: impl Into<String>, index_host: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            index_host: index_host.into(),
            namespace: None,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.api_key.is_empty() {
            return Err(DomainError::configuration("pinecone.api_key is required"));
        }
        if self.index_host.is_empty() {
            return Err(DomainError::configuration("pinecone.index_host is required"));
        }
        Ok(())
    }
}

/// Queries a Pinecone index over its REST API
#[derive(Debug)]
pub struct PineconeIndex<C: HttpClientTrait> {
    client: C,
    api_key: String,
    query_url: String,
    namespace: Option<String>,
}

impl<C: HttpClientTrait> PineconeIndex<C> {
    pub fn new(client: C, config: &PineconeConfig) -> Self {
        let host = config.index_host.trim_end_matches('/');
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };

        Self {
            client,
            api_key: config.api_key.clone(),
            query_url: format!("{}/query", host),
            namespace: config.namespace.clone(),
        }
    }

    fn build_request(&self, vector: &[f32], top_k: u32) -> Value {
        let mut body = serde_json::json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
            "includeValues": false,
        });

        if let Some(namespace) = &self.namespace {
            body["namespace"] = Value::String(namespace.clone());
        }

        body
    }
}

#[async_trait]
impl<C: HttpClientTrait> VectorIndex for PineconeIndex<C> {
    async fn query(&self, vector: &[f32], top_k: u32) -> Result<Vec<VectorMatch>, DomainError> {
        let body = self.build_request(vector, top_k);
        let headers = vec![
            ("Api-Key", self.api_key.as_str()),
            ("Content-Type", "application/json"),
        ];

        let json = self
            .client
            .post_json(&self.query_url, headers, &body)
            .await?;

        let response: PineconeQueryResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("pinecone", format!("Failed to parse query response: {}", e))
        })?;

        debug!(matches = response.matches.len(), top_k, "Pinecone query complete");

        Ok(response
            .matches
            .into_iter()
            .map(|m| VectorMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata.unwrap_or_default(),
            })
            .collect())
    }

    fn provider_name(&self) -> &'static str {
        "pinecone"
    }
}

#[derive(Debug, Deserialize)]
struct PineconeQueryResponse {
    #[serde(default)]
    matches: Vec<PineconeMatch>,
}

#[derive(Debug, Deserialize)]
struct PineconeMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<BTreeMap<String, Value>>,
}
