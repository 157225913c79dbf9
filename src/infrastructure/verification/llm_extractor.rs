//! Chat-model claim extraction

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::domain::generation::json_to_text;
use crate::domain::llm::LlmRequest;
use crate::domain::verification::ClaimExtractor;
use crate::domain::DomainError;
use crate::infrastructure::llm::ChatClient;

const SYSTEM_PROMPT: &str = "Extract 3-8 atomic, factual claims from the provided answer. \
    Return only a JSON object with a 'claims' array, each item having \
    a 'claim_text' string.";

/// Asks a chat model for atomic claims; malformed replies yield no claims
#[derive(Debug)]
pub struct LlmClaimExtractor {
    chat: ChatClient,
}

impl LlmClaimExtractor {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }
}

#[async_trait]
impl ClaimExtractor for LlmClaimExtractor {
    async fn extract(&self, question: &str, answer: &str) -> Result<Vec<String>, DomainError> {
        let cleaned = answer.trim();
        if cleaned.is_empty() {
            return Ok(Vec::new());
        }

        let request = LlmRequest::builder()
            .system(SYSTEM_PROMPT)
            .user(format!(
                "Question: {}\n\nAnswer:\n{}\n\n\
                 Return JSON: {{\"claims\": [{{\"claim_text\": \"...\"}}]}}",
                question, cleaned
            ))
            .temperature(0.0)
            .json_object()
            .build();

        let payload = self.chat.complete_json(request).await?;
        let Some(items) = payload.get("claims").and_then(Value::as_array) else {
            debug!("Claim extraction reply had no claims array");
            return Ok(Vec::new());
        };

        Ok(items
            .iter()
            .filter_map(Value::as_object)
            .map(|item| item.get("claim_text").map(json_to_text).unwrap_or_default())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect())
    }

    fn extractor_name(&self) -> &'static str {
        "llm"
    }
}
