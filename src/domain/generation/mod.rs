//! Grounded answer generation: prompt context, citation parsing and grounding rules

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use uuid::Uuid;

use crate::domain::retrieval::RetrievedChunk;
use crate::domain::verification::signals_insufficient_evidence;
use crate::domain::DomainError;

/// Answer returned when no chunks were retrieved
pub const NO_CONTEXT_ANSWER: &str = "insufficient evidence";
/// Answer returned when the final attempt cites nothing valid
pub const CLARIFY_ANSWER: &str = "insufficient evidence. Suggested follow-ups: clarify the question.";
/// Answer returned when every attempt produced an empty payload
pub const NARROW_ANSWER: &str = "insufficient evidence. Suggested follow-ups: narrow the question.";
/// Follow-ups used when the model declares insufficiency without suggesting any
pub const DEFAULT_FOLLOW_UPS: &str =
    "Suggested follow-ups: ask for a narrower question or specific sections.";

/// Answer text plus the chunk ids it cites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedAnswer {
    pub answer: String,
    pub cited_ids: Vec<Uuid>,
}

impl GeneratedAnswer {
    pub fn new(answer: impl Into<String>, cited_ids: Vec<Uuid>) -> Self {
        Self {
            answer: answer.into(),
            cited_ids,
        }
    }

    pub fn uncited(answer: impl Into<String>) -> Self {
        Self::new(answer, Vec::new())
    }
}

/// Produces an answer grounded in the given chunks
#[async_trait]
pub trait AnswerGenerator: Send + Sync + Debug {
    async fn generate(
        &self,
        question: &str,
        chunks: &[RetrievedChunk],
    ) -> Result<GeneratedAnswer, DomainError>;

    fn generator_name(&self) -> &'static str;
}

/// Context block: one `[CHUNK id]` section per chunk, blank-line separated
pub fn build_context(chunks: &[RetrievedChunk]) -> String {
    chunks
        .iter()
        .map(|chunk| {
            format!(
                "[CHUNK {}]\nSource: {} | Pages: {}\n{}",
                chunk.chunk_id,
                chunk.source_title.as_deref().unwrap_or("Untitled"),
                chunk.page_label(),
                chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Cited ids from a `citations` array of strings or `{chunk_id}` objects
pub fn parse_citation_ids(payload: &serde_json::Value) -> Vec<String> {
    let Some(items) = payload.get("citations").and_then(|c| c.as_array()) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            serde_json::Value::String(id) => Some(id.clone()),
            serde_json::Value::Object(map) => map.get("chunk_id").map(json_to_text),
            _ => None,
        })
        .collect()
}

/// "Suggested follow-ups: a; b" from a `follow_ups` array, if it has any non-blank item
pub fn format_follow_ups(raw: Option<&serde_json::Value>) -> Option<String> {
    let items = raw?.as_array()?;
    let cleaned: Vec<String> = items
        .iter()
        .map(|item| json_to_text(item).trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Some(format!("Suggested follow-ups: {}", cleaned.join("; ")))
}

/// Uncited answers that do not already admit insufficiency are replaced
pub fn enforce_grounded_answer(generated: GeneratedAnswer) -> GeneratedAnswer {
    if !generated.cited_ids.is_empty() || signals_insufficient_evidence(&generated.answer) {
        return generated;
    }
    GeneratedAnswer::uncited(CLARIFY_ANSWER)
}

/// String form of a JSON scalar (strings unquoted, null as empty)
pub fn json_to_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
