//! Observability infrastructure - Tracing and Metrics

mod config;
mod metrics;
mod tracing_setup;

pub use config::{MetricsConfig, ObservabilityConfig, TracingConfig};
pub use metrics::{
    error_type, init_metrics, record_embedding_request, record_llm_chat,
    record_retrieval_candidates, record_summary_inconsistent, LlmChatMetricParams,
    PrometheusMetrics,
};
pub use tracing_setup::{init_tracing, shutdown_tracing};
