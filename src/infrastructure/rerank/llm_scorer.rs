//! LLM-based relevance scorer
//!
//! Asks a chat model to grade candidate snippets against the question.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::llm::LlmRequest;
use crate::domain::retrieval::{clean_snippet, RelevanceScorer, RetrievedChunk};
use crate::domain::DomainError;
use crate::infrastructure::llm::ChatClient;

const SYSTEM_PROMPT: &str =
    "You are a reranker. Score relevance for each chunk. Respond with JSON only.";

/// Relevance scorer backed by a chat model
#[derive(Debug)]
pub struct LlmRelevanceScorer {
    chat: ChatClient,
}

impl LlmRelevanceScorer {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }

    fn build_prompt(question: &str, candidates: &[RetrievedChunk], snippet_chars: usize) -> String {
        let parts: Vec<String> = candidates
            .iter()
            .map(|chunk| {
                format!(
                    "[CHUNK {}]\n{}",
                    chunk.chunk_id,
                    clean_snippet(&chunk.text, snippet_chars)
                )
            })
            .collect();

        format!(
            "Score how relevant each chunk is to the question.\n\
             Return a JSON object with a 'scores' array of objects:\n\
             {{\"chunk_id\": \"<uuid>\", \"score\": 0-100}}.\n\
             Only include chunk_ids that appear below.\n\n\
             Question: {}\n\n\
             Chunks:\n{}",
            question,
            parts.join("\n\n")
        )
    }
}

/// Scores for known chunk ids, clamped into [0, 100]; anything malformed is skipped
pub fn parse_scores(payload: &Map<String, Value>, valid_ids: &HashSet<Uuid>) -> HashMap<Uuid, f64> {
    let Some(items) = payload.get("scores").and_then(Value::as_array) else {
        return HashMap::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|item| {
            let chunk_id = item
                .get("chunk_id")
                .and_then(Value::as_str)
                .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
                .filter(|id| valid_ids.contains(id))?;
            let score = item.get("score").and_then(Value::as_f64)?;
            Some((chunk_id, score.clamp(0.0, 100.0)))
        })
        .collect()
}

#[async_trait]
impl RelevanceScorer for LlmRelevanceScorer {
    async fn score(
        &self,
        question: &str,
        candidates: &[RetrievedChunk],
        snippet_chars: usize,
    ) -> Result<HashMap<Uuid, f64>, DomainError> {
        let request = LlmRequest::builder()
            .system(SYSTEM_PROMPT)
            .user(Self::build_prompt(question, candidates, snippet_chars))
            .temperature(0.0)
            .json_object()
            .build();

        let payload = match self.chat.complete_json(request).await {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Relevance scoring failed, keeping pre-sorted order");
                return Ok(HashMap::new());
            }
        };

        let valid_ids: HashSet<Uuid> = candidates.iter().map(|c| c.chunk_id).collect();
        let scores = parse_scores(&payload, &valid_ids);

        debug!(
            candidates = candidates.len(),
            scored = scores.len(),
            "LLM relevance scores parsed"
        );

        Ok(scores)
    }

    fn scorer_name(&self) -> &'static str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::retrieval::{rerank_chunks, RerankConfig};
    use serde_json::json;
    use std::sync::Arc;

    fn chunks() -> Vec<RetrievedChunk> {
        vec![
            RetrievedChunk::new(Uuid::new_v4(), Uuid::nil(), "Refunds   take\n10 days.").with_score(0.9),
            RetrievedChunk::new(Uuid::new_v4(), Uuid::nil(), "The fee is 25.").with_score(0.8),
        ]
    }

    fn config() -> RerankConfig {
        RerankConfig {
            enabled: true,
            candidates: 20,
            snippet_chars: 400,
        }
    }

    #[test]
    fn test_parse_scores_filters_and_clamps() {
        let known = Uuid::new_v4();
        let other = Uuid::new_v4();
        let valid: HashSet<Uuid> = [known, other].into_iter().collect();

        let payload = json!({
            "scores": [
                {"chunk_id": known.to_string(), "score": 140},
                {"chunk_id": other.to_string(), "score": "high"},
                {"chunk_id": Uuid::new_v4().to_string(), "score": 50},
                {"chunk_id": "not-a-uuid", "score": 10},
                "junk"
            ]
        });
        let scores = parse_scores(payload.as_object().unwrap(), &valid);

        assert_eq!(scores.len(), 1);
        assert_eq!(scores[&known], 100.0);
    }

    #[test]
    fn test_parse_scores_without_array() {
        let payload = json!({"scores": {"a": 1}});
        assert!(parse_scores(payload.as_object().unwrap(), &HashSet::new()).is_empty());
    }

    #[tokio::test]
    async fn test_llm_scores_reorder_window() {
        let chunks = chunks();
        let reply = json!({"scores": [
            {"chunk_id": chunks[0].chunk_id.to_string(), "score": 10},
            {"chunk_id": chunks[1].chunk_id.to_string(), "score": 90}
        ]});
        let provider = Arc::new(MockLlmProvider::new("mock").with_response(reply.to_string()));
        let scorer = LlmRelevanceScorer::new(ChatClient::new(provider.clone(), "gpt-4o-mini"));

        let reranked = rerank_chunks(&scorer, "What is the fee?", chunks.clone(), &config())
            .await
            .unwrap();

        assert_eq!(reranked[0].chunk_id, chunks[1].chunk_id);
        assert_eq!(reranked[0].score, 90.0);

        let request = &provider.requests()[0];
        assert_eq!(request.system_text(), Some(SYSTEM_PROMPT));
        let prompt = request.user_text().unwrap();
        assert!(prompt.contains("Question: What is the fee?"));
        assert!(prompt.contains(&format!("[CHUNK {}]\nRefunds take 10 days.", chunks[0].chunk_id)));
    }

    #[tokio::test]
    async fn test_chat_failure_keeps_presorted_order() {
        let chunks = chunks();
        let provider = Arc::new(MockLlmProvider::new("mock").with_error("timeout"));
        let scorer = LlmRelevanceScorer::new(ChatClient::new(provider, "gpt-4o-mini"));

        let reranked = rerank_chunks(&scorer, "q", chunks.clone(), &config()).await.unwrap();
        assert_eq!(reranked, chunks);
    }

    #[tokio::test]
    async fn test_non_json_reply_keeps_presorted_order() {
        let chunks = chunks();
        let provider = Arc::new(MockLlmProvider::new("mock").with_response("I think chunk 2."));
        let scorer = LlmRelevanceScorer::new(ChatClient::new(provider, "gpt-4o-mini"));

        let reranked = rerank_chunks(&scorer, "q", chunks.clone(), &config()).await.unwrap();
        assert_eq!(reranked, chunks);
    }
}
