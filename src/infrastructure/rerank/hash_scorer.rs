//! Reproducible pseudo-random relevance scores for offline runs

use std::collections::HashMap;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::retrieval::{clean_snippet, RelevanceScorer, RetrievedChunk};
use crate::domain::DomainError;

/// Scores each candidate by hashing `question|chunk_id|snippet` into [0, 100).
///
/// The scores are stable across runs but carry no relevance signal.
#[derive(Debug, Default)]
pub struct HashRelevanceScorer;

impl HashRelevanceScorer {
    pub fn new() -> Self {
        Self
    }
}

/// First eight digest bytes read big-endian, scaled from [0, 2^64) to [0, 100)
pub fn hash_score(question: &str, chunk_id: &Uuid, snippet: &str) -> f64 {
    let payload = format!("{}|{}|{}", question, chunk_id, snippet);
    let digest = Sha256::digest(payload.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let value = u64::from_be_bytes(head);
    (value as f64 / 2f64.powi(64)) * 100.0
}

#[async_trait]
impl RelevanceScorer for HashRelevanceScorer {
    async fn score(
        &self,
        question: &str,
        candidates: &[RetrievedChunk],
        snippet_chars: usize,
    ) -> Result<HashMap<Uuid, f64>, DomainError> {
        Ok(candidates
            .iter()
            .map(|chunk| {
                let snippet = clean_snippet(&chunk.text, snippet_chars);
                (chunk.chunk_id, hash_score(question, &chunk.chunk_id, &snippet))
            })
            .collect())
    }

    fn scorer_name(&self) -> &'static str {
        "hash"
    }
}
