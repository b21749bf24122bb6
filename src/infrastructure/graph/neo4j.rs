//! Neo4j full-text relationship lookup

use std::fmt;

use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph, Row};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{DomainError, GraphFact, GraphQuery, GraphStore};

const DEFAULT_INDEX_NAME: &str = "entityFullTextIndex";

/// Characters with special meaning in Lucene query syntax
const LUCENE_SPECIAL: &[char] = &[
    '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '\\',
    '/',
];

/// Neo4j connection settings
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Neo4jConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Name of the full-text index over entity nodes
    pub index_name: String,
    pub max_connections: usize,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://127.0.0.1:7687".to_string(),
            user: "neo4j".to_string(),
            password: String::new(),
            database: "neo4j".to_string(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            max_connections: 16,
        }
    }
}

impl fmt::Debug for Neo4jConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neo4jConfig")
            .field("uri", &self.uri)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("index_name", &self.index_name)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl Neo4jConfig {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.uri.is_empty() {
            return Err(DomainError::configuration("neo4j.uri is required"));
        }
        if !is_valid_index_name(&self.index_name) {
            return Err(DomainError::configuration(format!(
                "neo4j.index_name '{}' must be alphanumeric or underscore",
                self.index_name
            )));
        }
        Ok(())
    }
}

fn is_valid_index_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escapes Lucene operators so user text is matched as plain terms
fn escape_lucene(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        if LUCENE_SPECIAL.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}

/// Cypher for the relationship lookup. Index names cannot be parameters
/// in `YIELD`-style procedure calls on every server version, so the
/// validated name is inlined.
fn fulltext_cypher(index_name: &str) -> String {
    format!(
        "CALL db.index.fulltext.queryNodes(\"{}\", $query) YIELD node, score \
         MATCH (node)-[r]-(m:Entity) \
         RETURN node.id AS source, type(r) AS rel, \
                m.id AS target_id, m.name AS target_name, \
                m.type AS target_type, m.description AS target_desc \
         LIMIT $limit",
        index_name
    )
}

/// Graph store backed by a Neo4j full-text index
#[derive(Clone)]
pub struct Neo4jGraphStore {
    graph: Graph,
    cypher: String,
}

impl fmt::Debug for Neo4jGraphStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neo4jGraphStore")
            .field("graph", &"<Graph>")
            .field("cypher", &self.cypher)
            .finish()
    }
}

impl Neo4jGraphStore {
    pub async fn connect(config: &Neo4jConfig) -> Result<Self, DomainError> {
        config.validate()?;

        let neo4j_config = ConfigBuilder::default()
            .uri(config.uri.as_str())
            .user(config.user.as_str())
            .password(config.password.as_str())
            .db(config.database.as_str())
            .max_connections(config.max_connections)
            .build()
            .map_err(|e| DomainError::configuration(format!("Invalid Neo4j config: {}", e)))?;

        let graph = Graph::connect(neo4j_config)
            .await
            .map_err(|e| DomainError::provider("neo4j", format!("Failed to connect: {}", e)))?;

        info!(uri = %config.uri, index = %config.index_name, "Connected to Neo4j");

        Ok(Self {
            graph,
            cypher: fulltext_cypher(&config.index_name),
        })
    }

    fn fact_from_row(row: &Row, desc_chars: usize) -> Result<GraphFact, DomainError> {
        let field = |name: &str| -> Result<Option<String>, DomainError> {
            row.get::<Option<String>>(name).map_err(|e| {
                DomainError::provider("neo4j", format!("Failed to extract {}: {}", name, e))
            })
        };

        let mut fact = GraphFact::new(
            field("source")?.unwrap_or_default(),
            field("rel")?.unwrap_or_default(),
            field("target_id")?.unwrap_or_default(),
        )
        .with_target_desc(field("target_desc")?.unwrap_or_default())
        .truncate_desc(desc_chars);

        fact.target_name = field("target_name")?;
        fact.target_type = field("target_type")?;

        Ok(fact)
    }
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn full_text_query(&self, request: &GraphQuery) -> Result<Vec<GraphFact>, DomainError> {
        let cypher = query(&self.cypher)
            .param("query", escape_lucene(&request.text))
            .param("limit", i64::from(request.limit));

        let mut rows = self
            .graph
            .execute(cypher)
            .await
            .map_err(|e| DomainError::provider("neo4j", format!("Full-text query failed: {}", e)))?;

        let mut facts = Vec::new();

        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::provider("neo4j", format!("Failed to read result: {}", e)))?
        {
            facts.push(Self::fact_from_row(&row, request.desc_chars)?);
        }

        debug!(facts = facts.len(), "Graph query complete");
        Ok(facts)
    }

    fn provider_name(&self) -> &'static str {
        "neo4j"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_lucene() {
        assert_eq!(escape_lucene("best beaches in Thailand"), "best beaches in Thailand");
        assert_eq!(escape_lucene("Hoi An: what?"), "Hoi An\\: what\\?");
        assert_eq!(escape_lucene("(a/b)"), "\\(a\\/b\\)");
    }

    #[test]
    fn test_cypher_inlines_index_and_limits() {
        let cypher = fulltext_cypher("entityFullTextIndex");

        assert!(cypher.starts_with("CALL db.index.fulltext.queryNodes(\"entityFullTextIndex\", $query)"));
        assert!(cypher.contains("MATCH (node)-[r]-(m:Entity)"));
        assert!(cypher.contains("m.description AS target_desc"));
        assert!(cypher.ends_with("LIMIT $limit"));
    }

    #[test]
    fn test_config_validation() {
        assert!(Neo4jConfig::default().validate().is_ok());

        let injected = Neo4jConfig {
            index_name: "idx\") YIELD node".to_string(),
            ..Default::default()
        };
        assert!(injected.validate().is_err());

        let no_uri = Neo4jConfig {
            uri: String::new(),
            ..Default::default()
        };
        assert!(no_uri.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = Neo4jConfig {
            password: "hunter2".to_string(),
            ..Default::default()
        };

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    #[ignore = "Requires running Neo4j instance with entityFullTextIndex"]
    async fn test_full_text_query_against_live_server() {
        let config = Neo4jConfig {
            password: std::env::var("NEO4J_PASSWORD").unwrap_or_default(),
            ..Default::default()
        };
        let store = Neo4jGraphStore::connect(&config).await.unwrap();

        let facts = store
            .full_text_query(&GraphQuery::new("Thailand").with_limit(5))
            .await
            .unwrap();

        assert!(facts.len() <= 5);
        assert!(facts.iter().all(|f| f.target_desc.chars().count() <= 400));
    }
}
