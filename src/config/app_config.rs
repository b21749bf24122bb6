use serde::Deserialize;

use crate::domain::{DomainError, RetrievalConfig, SemanticCacheConfig};
use crate::infrastructure::cache::StoreConfig;
use crate::infrastructure::graph::Neo4jConfig;
use crate::infrastructure::logging::LoggingConfig;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::vector_index::PineconeConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub store: StoreConfig,
    pub semantic_cache: SemanticCacheConfig,
    pub retrieval: RetrievalConfig,
    pub openai: OpenAiConfig,
    pub pinecone: PineconeConfig,
    pub neo4j: Neo4jConfig,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Whole-request HTTP timeout, independent of per-call deadlines
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl AppConfig {
    /// Layers `config/default`, `config/local` and `APP__*` environment
    /// variables, then fills empty credentials from the conventional
    /// provider variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_env_fallbacks(|name| std::env::var(name).ok());

        Ok(config)
    }

    fn apply_env_fallbacks(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fill = |slot: &mut String, name: &str| {
            if slot.is_empty() {
                if let Some(value) = lookup(name) {
                    *slot = value;
                }
            }
        };

        fill(&mut self.openai.api_key, "OPENAI_API_KEY");
        fill(&mut self.pinecone.api_key, "PINECONE_API_KEY");
        fill(&mut self.pinecone.index_host, "PINECONE_INDEX_HOST");
        fill(&mut self.neo4j.password, "NEO4J_PASSWORD");

        if self.store.redis_url.is_none() {
            self.store.redis_url = lookup("REDIS_URL");
        }
    }

    /// Checks every section before any backend is contacted
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.openai.api_key.is_empty() {
            return Err(DomainError::configuration(
                "openai.api_key is required (or set OPENAI_API_KEY)",
            ));
        }

        self.semantic_cache.validate()?;
        self.retrieval.validate()?;
        self.pinecone.validate()?;
        self.neo4j.validate()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CacheMode;
    use crate::infrastructure::cache::StoreType;
    use crate::infrastructure::logging::LogFormat;

    fn from_toml(source: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_from_empty_source() {
        let config = from_toml("");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.store.backend, StoreType::InMemory);
        assert_eq!(config.semantic_cache.similarity_threshold, 0.7);
        assert_eq!(config.semantic_cache.ttl_secs, 86400);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.chat_model, "gpt-4o-mini");
        assert_eq!(config.neo4j.index_name, "entityFullTextIndex");
        assert_eq!(config.openai.base_url, "https://api.openai.com");
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = from_toml(
            r#"
            [logging]
            level = "debug"
            format = "json"

            [store]
            backend = "redis"
            redis_url = "redis://cache:6379"

            [semantic_cache]
            similarity_threshold = 0.85
            ttl_secs = 3600

            [retrieval]
            top_k = 8
            cache_mode = "retrieval"

            [retrieval.retry]
            max_retries = 1

            [pinecone]
            api_key = "pc"
            index_host = "travel.svc.pinecone.io"
            "#,
        );

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.store.backend, StoreType::Redis);
        assert_eq!(config.store.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.semantic_cache.similarity_threshold, 0.85);
        assert_eq!(config.semantic_cache.ttl_secs, 3600);
        assert_eq!(config.semantic_cache.metadata_prefix, "meta:");
        assert_eq!(config.retrieval.top_k, 8);
        assert_eq!(config.retrieval.cache_mode, CacheMode::Retrieval);
        assert_eq!(config.retrieval.retry.max_retries, 1);
        assert_eq!(config.retrieval.retry.initial_delay_ms, 100);
        assert_eq!(config.retrieval.max_tokens, 600);
    }

    #[test]
    fn test_env_fallbacks_fill_only_empty_values() {
        let mut config = AppConfig::default();
        config.pinecone.api_key = "from-file".to_string();

        config.apply_env_fallbacks(|name| match name {
            "OPENAI_API_KEY" => Some("sk-env".to_string()),
            "PINECONE_API_KEY" => Some("pc-env".to_string()),
            "REDIS_URL" => Some("redis://env:6379".to_string()),
            _ => None,
        });

        assert_eq!(config.openai.api_key, "sk-env");
        assert_eq!(config.pinecone.api_key, "from-file");
        assert_eq!(config.store.redis_url.as_deref(), Some("redis://env:6379"));
        assert!(config.neo4j.password.is_empty());
    }

    #[test]
    fn test_validate_requires_credentials() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_err());

        config.openai.api_key = "sk".to_string();
        assert!(config.validate().is_err());

        config.pinecone = PineconeConfig::new("pc", "travel.svc.pinecone.io");
        assert!(config.validate().is_ok());

        config.semantic_cache.similarity_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = OpenAiConfig {
            api_key: "sk-secret".to_string(),
            ..Default::default()
        };

        assert!(!format!("{:?}", config).contains("sk-secret"));
    }
}
