//! Chat-model evidence highlighting with a heuristic fallback.
//!
//! The model sees chunk text cut to the configured limit, so a span is only
//! accepted when it fits that prefix. Accepted offsets are then applied to the
//! full chunk text.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use crate::domain::llm::LlmRequest;
use crate::domain::retrieval::RetrievedChunk;
use crate::domain::text::{char_len, char_slice, truncate_chars};
use crate::domain::verification::{
    token_window_span, Claim, ClaimHighlight, EvidenceHighlight, EvidenceHighlighter,
    EvidenceRelation, HighlightSpan, VerificationConfig,
};
use crate::domain::DomainError;
use crate::infrastructure::llm::ChatClient;

const SYSTEM_PROMPT: &str = "You extract evidence highlight spans. \
    Return JSON only with a 'spans' array. \
    Do not include any other text. \
    Only use the provided chunk_id values. \
    Span start/end must be integers within the provided chunk_text length. \
    If no span is found for an evidence item, omit it.";

type SpanKey = (Uuid, EvidenceRelation);

/// Asks a chat model for one span per evidence item of each claim
#[derive(Debug)]
pub struct LlmEvidenceHighlighter {
    chat: ChatClient,
    config: VerificationConfig,
}

impl LlmEvidenceHighlighter {
    pub fn new(chat: ChatClient, config: VerificationConfig) -> Self {
        Self { chat, config }
    }

    async fn request_spans(
        &self,
        question: &str,
        claim: &Claim,
        chunks: &HashMap<Uuid, &RetrievedChunk>,
    ) -> Result<HashMap<SpanKey, (usize, usize)>, DomainError> {
        let mut evidence_payload = Vec::new();
        let mut prefix_lengths: HashMap<Uuid, usize> = HashMap::new();

        for evidence in &claim.evidence {
            let Some(chunk) = chunks.get(&evidence.chunk_id) else {
                continue;
            };
            let truncated = truncate_chars(&chunk.text, self.config.chunk_text_limit);
            let truncated_len = char_len(&truncated);
            evidence_payload.push(json!({
                "chunk_id": evidence.chunk_id.to_string(),
                "relation": evidence.relation.as_str(),
                "chunk_text": truncated,
                "chunk_text_length": truncated_len,
                "chunk_full_length": char_len(&chunk.text),
            }));
            prefix_lengths.insert(evidence.chunk_id, truncated_len);
        }

        if evidence_payload.is_empty() {
            return Ok(HashMap::new());
        }

        let evidence_json = serde_json::to_string(&evidence_payload)
            .map_err(|e| DomainError::internal(format!("Failed to encode evidence: {}", e)))?;
        let user_prompt = format!(
            "Question: {}\nClaim: {}\n\nEvidence:\n{}\n\n\
             Return JSON: {{\"spans\": [{{\"chunk_id\": \"...\", \
             \"relation\": \"SUPPORTS|CONTRADICTS|RELATED\", \"start\": 0, \
             \"end\": 10}}]}}",
            question, claim.claim_text, evidence_json
        );

        let request = LlmRequest::builder()
            .system(SYSTEM_PROMPT)
            .user(user_prompt)
            .temperature(0.0)
            .json_object()
            .build();
        let payload = self.chat.complete_json(request).await?;

        Ok(parse_spans(payload.get("spans"), &prefix_lengths))
    }
}

/// Well-formed spans keyed by (chunk, relation).
///
/// A span needs a known chunk id, a valid relation and integer offsets with
/// `0 <= start < end <= prefix length`.
pub fn parse_spans(
    raw: Option<&Value>,
    prefix_lengths: &HashMap<Uuid, usize>,
) -> HashMap<SpanKey, (usize, usize)> {
    let Some(items) = raw.and_then(Value::as_array) else {
        return HashMap::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|item| {
            let chunk_id = item
                .get("chunk_id")
                .and_then(Value::as_str)
                .and_then(|s| Uuid::parse_str(s.trim()).ok())?;
            let relation = item
                .get("relation")
                .and_then(Value::as_str)
                .and_then(EvidenceRelation::parse)?;
            let start = item.get("start").and_then(Value::as_u64)? as usize;
            let end = item.get("end").and_then(Value::as_u64)? as usize;
            let limit = *prefix_lengths.get(&chunk_id)?;
            (start < end && end <= limit).then_some(((chunk_id, relation), (start, end)))
        })
        .collect()
}

fn span_from_offsets(text: &str, start: usize, end: usize) -> Option<HighlightSpan> {
    if end > char_len(text) {
        return None;
    }
    let slice = char_slice(text, start, end);
    (!slice.is_empty()).then_some(HighlightSpan {
        start,
        end,
        text: slice,
    })
}

#[async_trait]
impl EvidenceHighlighter for LlmEvidenceHighlighter {
    async fn highlight(
        &self,
        question: &str,
        claims: &[Claim],
        chunks: &[RetrievedChunk],
    ) -> Result<Vec<ClaimHighlight>, DomainError> {
        let lookup: HashMap<Uuid, &RetrievedChunk> = chunks.iter().map(|c| (c.chunk_id, c)).collect();
        let mut highlighted = Vec::with_capacity(claims.len());

        for claim in claims {
            let spans = match self.request_spans(question, claim, &lookup).await {
                Ok(spans) => spans,
                Err(e) => {
                    warn!(error = %e, "Highlight request failed, using token window");
                    HashMap::new()
                }
            };

            let evidence = claim
                .evidence
                .iter()
                .map(|item| {
                    let Some(chunk) = lookup.get(&item.chunk_id) else {
                        return EvidenceHighlight::unhighlighted(item);
                    };
                    let span = spans
                        .get(&(item.chunk_id, item.relation))
                        .and_then(|&(start, end)| span_from_offsets(&chunk.text, start, end))
                        .or_else(|| token_window_span(&claim.claim_text, &chunk.text));
                    EvidenceHighlight::unhighlighted(item).with_span(span)
                })
                .collect();

            highlighted.push(ClaimHighlight::new(claim, evidence));
        }

        Ok(highlighted)
    }

    fn highlighter_name(&self) -> &'static str {
        "llm"
    }
}
