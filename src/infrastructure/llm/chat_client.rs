//! Instrumented chat access shared by every LLM-backed component

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::{ChatCompletion, DomainError, LlmProvider, LlmRequest};
use crate::infrastructure::observability::{record_llm_chat, LlmChatMetricParams};

/// A provider bound to one model, recording latency, outcome and token metrics
#[derive(Debug, Clone)]
pub struct ChatClient {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl ChatClient {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(&self, request: LlmRequest) -> Result<ChatCompletion, DomainError> {
        let start = Instant::now();
        let result = self.provider.chat(&self.model, request).await;

        record_llm_chat(LlmChatMetricParams {
            provider: self.provider.provider_name(),
            model: &self.model,
            duration: start.elapsed(),
            error: result.as_ref().err(),
            usage: result.as_ref().ok().and_then(|r| r.usage.as_ref()),
        });

        result
    }

    /// Chat call whose reply is read as a JSON object; anything else yields an
    /// empty map
    pub async fn complete_json(&self, request: LlmRequest) -> Result<Map<String, Value>, DomainError> {
        let response = self.complete(request).await?;
        let payload = parse_json_object(response.text());
        if payload.is_empty() {
            debug!(model = %self.model, "Chat reply was not a JSON object");
        }
        Ok(payload)
    }
}

/// Parse `content` as a JSON object, returning an empty map otherwise
pub fn parse_json_object(content: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}
