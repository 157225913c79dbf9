//! Second-stage relevance reranking over the top pre-sorted candidates

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use uuid::Uuid;

use super::RetrievedChunk;
use super::fusion::sort_by_score_desc;
use crate::domain::DomainError;

fn default_candidates() -> usize {
    20
}

fn default_snippet_chars() -> usize {
    400
}

/// Relevance reranking settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_candidates")]
    pub candidates: usize,
    #[serde(default = "default_snippet_chars")]
    pub snippet_chars: usize,
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            candidates: default_candidates(),
            snippet_chars: default_snippet_chars(),
        }
    }
}

/// Source of replacement relevance scores in [0, 100]
#[async_trait]
pub trait RelevanceScorer: Send + Sync + Debug {
    /// Score candidates; ids missing from the map keep their current score.
    /// An empty map means no usable scores.
    async fn score(
        &self,
        question: &str,
        candidates: &[RetrievedChunk],
        snippet_chars: usize,
    ) -> Result<HashMap<Uuid, f64>, DomainError>;

    fn scorer_name(&self) -> &'static str;
}

/// Collapse whitespace runs and cap at `max_len` characters (with `...`)
pub fn clean_snippet(text: &str, max_len: usize) -> String {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if max_len == 0 || cleaned.is_empty() {
        return String::new();
    }
    if cleaned.chars().count() <= max_len {
        return cleaned;
    }
    let mut out: String = cleaned.chars().take(max_len.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Rerank the first `config.candidates` chunks with `scorer`.
///
/// Input is pre-sorted by descending score. New scores overwrite the chunk
/// score, the window is re-sorted and the remainder is appended in order.
/// When the scorer yields nothing the pre-sorted order is returned.
pub async fn rerank_chunks(
    scorer: &dyn RelevanceScorer,
    question: &str,
    chunks: Vec<RetrievedChunk>,
    config: &RerankConfig,
) -> Result<Vec<RetrievedChunk>, DomainError> {
    if chunks.is_empty() {
        return Ok(chunks);
    }

    let mut pre_sorted = chunks;
    sort_by_score_desc(&mut pre_sorted);

    if !config.enabled || config.candidates == 0 {
        return Ok(pre_sorted);
    }

    let split = config.candidates.min(pre_sorted.len());
    let scores = scorer
        .score(question, &pre_sorted[..split], config.snippet_chars)
        .await?;

    if scores.is_empty() {
        return Ok(pre_sorted);
    }

    let remainder = pre_sorted.split_off(split);
    let mut window = pre_sorted;
    for chunk in window.iter_mut() {
        if let Some(score) = scores.get(&chunk.chunk_id) {
            chunk.score = *score;
        }
    }
    sort_by_score_desc(&mut window);
    window.extend(remainder);

    Ok(window)
}
