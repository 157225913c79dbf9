//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;
use crate::domain::{DomainError, TokenUsage};

/// Prometheus metrics handle for rendering the exposition text
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
}

impl PrometheusMetrics {
    /// Get the metrics in Prometheus text format
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Initialize Prometheus metrics
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("grounded_rag_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
            tracing::info!("Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
            })
        }
        Err(e) => {
            tracing::error!("Failed to initialize Prometheus metrics: {}", e);
            None
        }
    }
}

/// Parameters for chat completion metrics
pub struct LlmChatMetricParams<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    pub duration: Duration,
    /// `None` on success
    pub error: Option<&'a DomainError>,
    pub usage: Option<&'a TokenUsage>,
}

/// Record one chat completion call
pub fn record_llm_chat(params: LlmChatMetricParams) {
    let provider = params.provider.to_string();
    let model = params.model.to_string();
    let outcome = if params.error.is_some() { "error" } else { "success" };

    counter!(
        "llm_chat_requests_total",
        "provider" => provider.clone(),
        "model" => model.clone(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("llm_chat_latency_seconds", "provider" => provider.clone(), "model" => model.clone())
        .record(params.duration.as_secs_f64());

    if let Some(error) = params.error {
        counter!(
            "llm_chat_errors_total",
            "provider" => provider.clone(),
            "model" => model.clone(),
            "error_type" => error_type(error)
        )
        .increment(1);
    }

    if let Some(usage) = params.usage {
        for (token_type, count) in [
            ("prompt", usage.prompt_tokens),
            ("completion", usage.completion_tokens),
            ("total", usage.total_tokens),
        ] {
            counter!(
                "llm_chat_tokens_total",
                "provider" => provider.clone(),
                "model" => model.clone(),
                "token_type" => token_type
            )
            .increment(u64::from(count));
        }
    }
}

/// Record one embedding attempt
pub fn record_embedding_request(provider: &str, success: bool) {
    let outcome = if success { "success" } else { "error" };
    counter!("embedding_requests_total", "provider" => provider.to_string(), "outcome" => outcome)
        .increment(1);
}

/// Record how many candidates survived a retrieval stage
pub fn record_retrieval_candidates(stage: &'static str, count: usize) {
    histogram!("retrieval_candidates", "stage" => stage).record(count as f64);
}

/// Record a stored summary that disagreed with its claims
pub fn record_summary_inconsistent() {
    counter!("verification_summary_inconsistent_total").increment(1);
}

/// Low-cardinality label for an error
pub fn error_type(error: &DomainError) -> &'static str {
    match error {
        DomainError::NotFound { .. } => "not_found",
        DomainError::Validation { .. } => "validation",
        DomainError::Provider { .. } => "provider",
        DomainError::Configuration { .. } => "configuration",
        DomainError::Internal { .. } => "internal",
        DomainError::Storage { .. } => "storage",
        DomainError::Contract { .. } => "contract",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_type_labels() {
        assert_eq!(error_type(&DomainError::provider("openai", "timeout")), "provider");
        assert_eq!(error_type(&DomainError::storage("down")), "storage");
        assert_eq!(error_type(&DomainError::contract("x")), "contract");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        let usage = TokenUsage::new(3, 4);
        record_llm_chat(LlmChatMetricParams {
            provider: "mock",
            model: "m",
            duration: Duration::from_millis(5),
            error: None,
            usage: Some(&usage),
        });
        record_embedding_request("mock", false);
        record_retrieval_candidates("fused", 3);
        record_summary_inconsistent();
    }

    #[test]
    fn test_disabled_metrics() {
        let config = MetricsConfig {
            enabled: false,
            export_path: None,
        };
        assert!(init_metrics(&config).is_none());
    }
}
