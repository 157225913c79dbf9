//! Chat-model answer generation with citation guardrails

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::generation::{
    build_context, format_follow_ups, json_to_text, parse_citation_ids, AnswerGenerator,
    GeneratedAnswer, CLARIFY_ANSWER, DEFAULT_FOLLOW_UPS, NARROW_ANSWER, NO_CONTEXT_ANSWER,
};
use crate::domain::llm::LlmRequest;
use crate::domain::retrieval::RetrievedChunk;
use crate::domain::verification::{signals_insufficient_evidence, INSUFFICIENT_EVIDENCE_MARKER};
use crate::domain::DomainError;
use crate::infrastructure::llm::ChatClient;

const MAX_ATTEMPTS: usize = 2;

const GUARDRAIL: &str = "Only use the provided context. \
    Cite chunk IDs for each major claim. \
    If evidence is insufficient, reply with answer='insufficient evidence' \
    and include follow_ups.";

/// Generates answers with a chat model, retrying once with stricter instructions
#[derive(Debug)]
pub struct LlmAnswerGenerator {
    chat: ChatClient,
}

/// Outcome of checking one model payload
enum Attempt {
    Accepted(GeneratedAnswer),
    Rejected,
}

impl LlmAnswerGenerator {
    pub fn new(chat: ChatClient) -> Self {
        Self { chat }
    }

    fn build_request(question: &str, context: &str, allowed: &[String], strict: bool) -> LlmRequest {
        let mut guardrail = GUARDRAIL.to_string();
        if strict {
            guardrail.push_str(" You MUST use only these chunk IDs: ");
            guardrail.push_str(&allowed.join(", "));
        }

        let user_prompt = format!(
            "Question: {}\n\n\
             Context:\n{}\n\n\
             Return a JSON object with keys: \
             answer (string), citations (array of chunk_id strings), \
             follow_ups (array of strings).",
            question, context
        );

        LlmRequest::builder()
            .system(guardrail)
            .user(user_prompt)
            .temperature(0.0)
            .json_object()
            .build()
    }

    fn check_payload(payload: Map<String, Value>, allowed: &HashSet<Uuid>) -> Attempt {
        let payload = Value::Object(payload);
        let answer = payload
            .get("answer")
            .map(json_to_text)
            .unwrap_or_default()
            .trim()
            .to_string();

        if signals_insufficient_evidence(&answer) {
            let follow_ups = format_follow_ups(payload.get("follow_ups"))
                .unwrap_or_else(|| DEFAULT_FOLLOW_UPS.to_string());
            return Attempt::Accepted(GeneratedAnswer::uncited(format!(
                "{}. {}",
                INSUFFICIENT_EVIDENCE_MARKER, follow_ups
            )));
        }

        let raw_ids = parse_citation_ids(&payload);
        let cited: Vec<Uuid> = raw_ids
            .iter()
            .filter_map(|raw| Uuid::parse_str(raw).ok())
            .filter(|id| allowed.contains(id))
            .collect();

        if raw_ids.is_empty() || cited.len() != raw_ids.len() {
            debug!(
                cited = raw_ids.len(),
                valid = cited.len(),
                "Rejected answer with missing or foreign citations"
            );
            return Attempt::Rejected;
        }

        Attempt::Accepted(GeneratedAnswer::new(answer, cited))
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    async fn generate(
        &self,
        question: &str,
        chunks: &[RetrievedChunk],
    ) -> Result<GeneratedAnswer, DomainError> {
        if chunks.is_empty() {
            return Ok(GeneratedAnswer::uncited(NO_CONTEXT_ANSWER));
        }

        let allowed_ids: Vec<String> = chunks.iter().map(|c| c.chunk_id.to_string()).collect();
        let allowed: HashSet<Uuid> = chunks.iter().map(|c| c.chunk_id).collect();
        let context = build_context(chunks);

        for attempt in 0..MAX_ATTEMPTS {
            let strict = attempt > 0;
            let request = Self::build_request(question, &context, &allowed_ids, strict);
            let payload = self.chat.complete_json(request).await?;

            if payload.is_empty() {
                debug!(attempt, "Empty answer payload");
                continue;
            }

            match Self::check_payload(payload, &allowed) {
                Attempt::Accepted(answer) => return Ok(answer),
                Attempt::Rejected if attempt + 1 < MAX_ATTEMPTS => continue,
                Attempt::Rejected => {
                    warn!(attempts = MAX_ATTEMPTS, "Answer citations never grounded");
                    return Ok(GeneratedAnswer::uncited(CLARIFY_ANSWER));
                }
            }
        }

        Ok(GeneratedAnswer::uncited(NARROW_ANSWER))
    }

    fn generator_name(&self) -> &'static str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLlmProvider;
    use serde_json::json;
    use std::sync::Arc;

    fn chunks() -> Vec<RetrievedChunk> {
        vec![
            RetrievedChunk::new(Uuid::new_v4(), Uuid::new_v4(), "The fee is 25 dollars.")
                .with_title("Policy"),
            RetrievedChunk::new(Uuid::new_v4(), Uuid::new_v4(), "Refunds take 10 days."),
        ]
    }

    fn generator(provider: &Arc<MockLlmProvider>) -> LlmAnswerGenerator {
        LlmAnswerGenerator::new(ChatClient::new(provider.clone(), "gpt-4o-mini"))
    }

    #[tokio::test]
    async fn test_no_chunks_skips_the_model() {
        let provider = Arc::new(MockLlmProvider::new("mock"));
        let answer = generator(&provider).generate("q", &[]).await.unwrap();

        assert_eq!(answer.answer, NO_CONTEXT_ANSWER);
        assert!(answer.cited_ids.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_grounded_answer_accepted_first_try() {
        let chunks = chunks();
        let reply = json!({
            "answer": "The fee is 25 dollars.",
            "citations": [chunks[0].chunk_id.to_string()],
            "follow_ups": []
        });
        let provider = Arc::new(MockLlmProvider::new("mock").with_response(reply.to_string()));

        let answer = generator(&provider).generate("What is the fee?", &chunks).await.unwrap();

        assert_eq!(answer.answer, "The fee is 25 dollars.");
        assert_eq!(answer.cited_ids, vec![chunks[0].chunk_id]);
        assert_eq!(provider.call_count(), 1);

        let request = &provider.requests()[0];
        assert_eq!(request.system_text(), Some(GUARDRAIL));
        assert!(request.user_text().unwrap().starts_with("Question: What is the fee?\n\nContext:\n[CHUNK "));
    }

    #[tokio::test]
    async fn test_foreign_citation_retried_with_strict_prompt() {
        let chunks = chunks();
        let bad = json!({"answer": "Fee is 25.", "citations": [Uuid::new_v4().to_string()]});
        let good = json!({"answer": "Fee is 25.", "citations": [{"chunk_id": chunks[1].chunk_id.to_string()}]});
        let provider = Arc::new(
            MockLlmProvider::new("mock")
                .with_reply(bad.to_string())
                .with_reply(good.to_string()),
        );

        let answer = generator(&provider).generate("q", &chunks).await.unwrap();

        assert_eq!(answer.cited_ids, vec![chunks[1].chunk_id]);
        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert!(!requests[0].system_text().unwrap().contains("MUST"));
        let strict = requests[1].system_text().unwrap();
        assert!(strict.contains(&format!(
            "You MUST use only these chunk IDs: {}, {}",
            chunks[0].chunk_id, chunks[1].chunk_id
        )));
    }

    #[tokio::test]
    async fn test_ungrounded_twice_degrades_to_clarify() {
        let reply = json!({"answer": "Fee is 25.", "citations": []});
        let provider = Arc::new(MockLlmProvider::new("mock").with_response(reply.to_string()));

        let answer = generator(&provider).generate("q", &chunks()).await.unwrap();

        assert_eq!(answer.answer, CLARIFY_ANSWER);
        assert!(answer.cited_ids.is_empty());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_payloads_degrade_to_narrow() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_response("not json"));

        let answer = generator(&provider).generate("q", &chunks()).await.unwrap();

        assert_eq!(answer.answer, NARROW_ANSWER);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_insufficient_answer_formats_follow_ups() {
        let with_follow_ups = json!({
            "answer": "Insufficient evidence",
            "citations": ["ignored"],
            "follow_ups": ["Which year?", " "]
        });
        let provider = Arc::new(MockLlmProvider::new("mock").with_response(with_follow_ups.to_string()));
        let answer = generator(&provider).generate("q", &chunks()).await.unwrap();
        assert_eq!(answer.answer, "insufficient evidence. Suggested follow-ups: Which year?");
        assert!(answer.cited_ids.is_empty());

        let bare = json!({"answer": "insufficient evidence"});
        let provider = Arc::new(MockLlmProvider::new("mock").with_response(bare.to_string()));
        let answer = generator(&provider).generate("q", &chunks()).await.unwrap();
        assert_eq!(answer.answer, format!("insufficient evidence. {}", DEFAULT_FOLLOW_UPS));
    }

    #[tokio::test]
    async fn test_chat_errors_propagate() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_error("503"));
        let result = generator(&provider).generate("q", &chunks()).await;
        assert!(result.is_err());
    }
}
