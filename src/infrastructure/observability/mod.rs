//! Observability infrastructure - Metrics export

mod config;
mod metrics;

pub use config::MetricsConfig;
pub use metrics::init_metrics;
