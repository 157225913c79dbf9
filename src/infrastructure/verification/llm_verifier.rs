//! Chat-model claim verifier

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::domain::answer::coerce::{coerce_score, coerce_verdict};
use crate::domain::generation::json_to_text;
use crate::domain::llm::LlmRequest;
use crate::domain::retrieval::RetrievedChunk;
use crate::domain::text::truncate_with_ellipsis;
use crate::domain::verification::{
    build_evidence, prioritize_ids, Claim, ClaimVerifier, VerificationConfig,
};
use crate::domain::DomainError;
use crate::infrastructure::llm::ChatClient;

const SYSTEM_PROMPT: &str = "You are verifying claims against evidence. \
    Use only the provided chunks and return JSON only. \
    You MUST ONLY use chunk IDs that appear in the provided chunks. \
    Do not invent chunk IDs. \
    support_score and contradiction_score MUST be floats in [0,1]. \
    If unsure, set both scores to 0.0.";

/// Verifies every claim in one chat call and recomputes verdicts locally
#[derive(Debug)]
pub struct LlmClaimVerifier {
    chat: ChatClient,
    config: VerificationConfig,
}

impl LlmClaimVerifier {
    pub fn new(chat: ChatClient, config: VerificationConfig) -> Self {
        Self { chat, config }
    }

    fn build_prompt(&self, question: &str, claim_texts: &[String], chunks: &[RetrievedChunk]) -> String {
        let claim_list = claim_texts
            .iter()
            .map(|claim| format!("- {}", claim))
            .collect::<Vec<_>>()
            .join("\n");

        let blocks = chunks
            .iter()
            .map(|chunk| {
                format!(
                    "[CHUNK {}]\nSource: {} | Pages: {}\n{}",
                    chunk.chunk_id,
                    chunk.source_title.as_deref().unwrap_or("Untitled"),
                    chunk.page_label(),
                    truncate_with_ellipsis(&chunk.text, self.config.chunk_text_limit)
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "Question: {}\n\n\
             Claims:\n{}\n\n\
             Chunks:\n{}\n\n\
             Return JSON with key 'results', an array of objects with: \
             claim_text, verdict, supporting_chunk_ids, contradicting_chunk_ids, \
             support_score, contradiction_score.",
            question, claim_list, blocks
        )
    }

    fn claim_from_result(
        &self,
        claim_text: &str,
        result: Option<&Map<String, Value>>,
        chunks: &[RetrievedChunk],
        allowed: &HashSet<Uuid>,
        preferred: &HashSet<Uuid>,
    ) -> Claim {
        let field = |key: &str| result.and_then(|r| r.get(key));

        let support_ids = prioritize_ids(filter_ids(field("supporting_chunk_ids"), allowed), preferred);
        let contradict_ids =
            prioritize_ids(filter_ids(field("contradicting_chunk_ids"), allowed), preferred);
        let support_score = coerce_score(field("support_score"));
        let contradiction_score = coerce_score(field("contradiction_score"));

        let evidence = build_evidence(chunks, &support_ids, &contradict_ids, &self.config);
        let mut claim = Claim::scored(claim_text, support_score, contradiction_score, evidence);

        // Unscored results fall back to the model's own verdict.
        if support_score == 0.0 && contradiction_score == 0.0 {
            if let Some(verdict) = coerce_verdict(field("verdict")) {
                claim.verdict = verdict;
            }
        }
        claim
    }
}

/// Allowed chunk ids from a JSON array of strings, deduplicated in order
pub fn filter_ids(raw: Option<&Value>, allowed: &HashSet<Uuid>) -> Vec<Uuid> {
    let Some(items) = raw.and_then(Value::as_array) else {
        return Vec::new();
    };
    let mut ids = Vec::new();
    for id in items
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|s| Uuid::parse_str(s).ok())
    {
        if allowed.contains(&id) && !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

#[async_trait]
impl ClaimVerifier for LlmClaimVerifier {
    async fn verify(
        &self,
        question: &str,
        claim_texts: &[String],
        chunks: &[RetrievedChunk],
        cited_ids: &[Uuid],
    ) -> Result<Vec<Claim>, DomainError> {
        if chunks.is_empty() {
            return Ok(claim_texts.iter().map(Claim::unsupported).collect());
        }

        let request = LlmRequest::builder()
            .system(SYSTEM_PROMPT)
            .user(self.build_prompt(question, claim_texts, chunks))
            .temperature(0.0)
            .json_object()
            .build();
        let payload = self.chat.complete_json(request).await?;

        let mut results: HashMap<String, &Map<String, Value>> = HashMap::new();
        if let Some(items) = payload.get("results").and_then(Value::as_array) {
            for item in items.iter().filter_map(Value::as_object) {
                let text = item.get("claim_text").map(json_to_text).unwrap_or_default();
                let text = text.trim();
                if !text.is_empty() {
                    results.insert(text.to_string(), item);
                }
            }
        }
        debug!(
            claims = claim_texts.len(),
            results = results.len(),
            "Verification results parsed"
        );

        let allowed: HashSet<Uuid> = chunks.iter().map(|c| c.chunk_id).collect();
        let preferred: HashSet<Uuid> = cited_ids.iter().copied().collect();

        Ok(claim_texts
            .iter()
            .map(|text| {
                let result = results.get(text.as_str()).copied();
                self.claim_from_result(text, result, chunks, &allowed, &preferred)
            })
            .collect())
    }

    fn verifier_name(&self) -> &'static str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::verification::{EvidenceRelation, Verdict};
    use serde_json::json;
    use std::sync::Arc;

    fn chunks() -> Vec<RetrievedChunk> {
        vec![
            RetrievedChunk::new(Uuid::new_v4(), Uuid::new_v4(), "The fee is 25.")
                .with_title("Policy")
                .with_pages(1, 2),
            RetrievedChunk::new(Uuid::new_v4(), Uuid::new_v4(), "x".repeat(1200)),
        ]
    }

    fn verifier(provider: &Arc<MockLlmProvider>) -> LlmClaimVerifier {
        LlmClaimVerifier::new(
            ChatClient::new(provider.clone(), "gpt-4o-mini"),
            VerificationConfig::default(),
        )
    }

    #[test]
    fn test_filter_ids() {
        let known = Uuid::new_v4();
        let allowed: HashSet<Uuid> = [known].into_iter().collect();
        let raw = json!([known.to_string(), known.to_string(), Uuid::new_v4().to_string(), 3]);

        assert_eq!(filter_ids(Some(&raw), &allowed), vec![known]);
        assert!(filter_ids(Some(&json!("x")), &allowed).is_empty());
        assert!(filter_ids(None, &allowed).is_empty());
    }

    #[tokio::test]
    async fn test_verdict_recomputed_from_scores() {
        let chunks = chunks();
        let reply = json!({"results": [{
            "claim_text": "  The fee is 25. ",
            "verdict": "UNSUPPORTED",
            "supporting_chunk_ids": [chunks[0].chunk_id.to_string(), Uuid::new_v4().to_string()],
            "contradicting_chunk_ids": [],
            "support_score": 0.9,
            "contradiction_score": "0.1"
        }]});
        let provider = Arc::new(MockLlmProvider::new("mock").with_response(reply.to_string()));

        let claims = verifier(&provider)
            .verify("What is the fee?", &["The fee is 25.".to_string()], &chunks, &[])
            .await
            .unwrap();

        assert_eq!(claims[0].verdict, Verdict::Supported);
        assert_eq!(claims[0].contradiction_score, 0.1);
        assert_eq!(claims[0].evidence.len(), 1);
        assert_eq!(claims[0].evidence[0].chunk_id, chunks[0].chunk_id);
        assert_eq!(claims[0].evidence[0].relation, EvidenceRelation::Supports);
    }

    #[tokio::test]
    async fn test_model_verdict_used_when_unscored() {
        let chunks = chunks();
        let reply = json!({"results": [
            {"claim_text": "A", "verdict": "contradicted"},
            {"claim_text": "B", "verdict": "nonsense", "support_score": 3}
        ]});
        let provider = Arc::new(MockLlmProvider::new("mock").with_response(reply.to_string()));

        let claims = verifier(&provider)
            .verify("q", &["A".to_string(), "B".to_string(), "C".to_string()], &chunks, &[])
            .await
            .unwrap();

        assert_eq!(claims[0].verdict, Verdict::Contradicted);
        assert_eq!(claims[1].support_score, 1.0);
        assert_eq!(claims[1].verdict, Verdict::Supported);
        assert_eq!(claims[2].verdict, Verdict::Unsupported);
        assert!(claims[2].evidence.is_empty());
    }

    #[tokio::test]
    async fn test_prompt_truncates_chunks_and_lists_claims() {
        let chunks = chunks();
        let provider = Arc::new(MockLlmProvider::new("mock").with_response("{}"));

        verifier(&provider)
            .verify("q", &["A".to_string(), "B".to_string()], &chunks, &[])
            .await
            .unwrap();

        let request = &provider.requests()[0];
        assert_eq!(request.system_text(), Some(SYSTEM_PROMPT));
        let prompt = request.user_text().unwrap();
        assert!(prompt.starts_with("Question: q\n\nClaims:\n- A\n- B\n\nChunks:\n"));
        assert!(prompt.contains(&format!("[CHUNK {}]\nSource: Policy | Pages: 1-2\nThe fee is 25.", chunks[0].chunk_id)));
        assert!(prompt.contains(&format!("{}...", "x".repeat(897))));
        assert!(!prompt.contains(&"x".repeat(898)));
    }

    #[tokio::test]
    async fn test_cited_chunks_come_first() {
        let chunks = chunks();
        let reply = json!({"results": [{
            "claim_text": "A",
            "supporting_chunk_ids": [chunks[0].chunk_id.to_string(), chunks[1].chunk_id.to_string()],
            "support_score": 0.5
        }]});
        let provider = Arc::new(MockLlmProvider::new("mock").with_response(reply.to_string()));

        let claims = verifier(&provider)
            .verify("q", &["A".to_string()], &chunks, &[chunks[1].chunk_id])
            .await
            .unwrap();

        assert_eq!(claims[0].verdict, Verdict::WeakSupport);
        assert_eq!(claims[0].evidence[0].chunk_id, chunks[1].chunk_id);
    }

    #[tokio::test]
    async fn test_no_chunks_skips_the_model() {
        let provider = Arc::new(MockLlmProvider::new("mock"));
        let claims = verifier(&provider)
            .verify("q", &["A".to_string()], &[], &[])
            .await
            .unwrap();

        assert_eq!(claims, vec![Claim::unsupported("A")]);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_errors_propagate() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_error("down"));
        let result = verifier(&provider).verify("q", &["A".to_string()], &chunks(), &[]).await;
        assert!(result.is_err());
    }
}
