//! Prometheus metrics infrastructure

use metrics::{describe_counter, describe_histogram, gauge, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;

use super::config::MetricsConfig;
use crate::domain::DomainError;

/// Installs the Prometheus recorder and its scrape listener.
///
/// Returns `Ok(false)` when metrics are disabled. Metric macros in the
/// domain become no-ops in that case.
pub fn init_metrics(config: &MetricsConfig) -> Result<bool, DomainError> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return Ok(false);
    }

    PrometheusBuilder::new()
        .with_http_listener(config.listen_addr)
        .install()
        .map_err(|e| {
            DomainError::configuration(format!("Failed to install Prometheus exporter: {}", e))
        })?;

    register_default_metrics();

    tracing::info!("Prometheus metrics listening on {}", config.listen_addr);
    Ok(true)
}

fn register_default_metrics() {
    describe_counter!(
        "semantic_cache_puts_total",
        "Semantic cache writes, labelled by status"
    );
    describe_counter!(
        "semantic_cache_lookups_total",
        "Approximate lookups, labelled by outcome"
    );
    describe_histogram!(
        "semantic_cache_hit_similarity",
        "Cosine similarity of the selected entry on a hit"
    );
    describe_histogram!(
        "semantic_cache_scan_entries",
        "Metadata entries examined per lookup"
    );
    describe_histogram!(
        "semantic_cache_scan_duration_seconds",
        Unit::Seconds,
        "Time spent scanning metadata entries"
    );
    describe_counter!(
        "retrieval_answers_total",
        "Answers returned, labelled by origin"
    );
    describe_counter!(
        "retrieval_cache_errors_total",
        "Cache failures tolerated by the orchestrator, labelled by stage"
    );
    describe_histogram!(
        "retrieval_fanout_duration_seconds",
        Unit::Seconds,
        "Wall time of the concurrent vector and graph lookups"
    );
    describe_histogram!(
        "retrieval_completion_duration_seconds",
        Unit::Seconds,
        "Chat completion latency including retries"
    );

    gauge!("hybrid_rag_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}
