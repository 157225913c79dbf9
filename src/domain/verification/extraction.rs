//! Claim extraction seam

use async_trait::async_trait;
use std::fmt::Debug;

use super::answer_text::signals_insufficient_evidence;
use crate::domain::text::split_sentences;
use crate::domain::DomainError;

/// Splits an answer into atomic factual claims
#[async_trait]
pub trait ClaimExtractor: Send + Sync + Debug {
    async fn extract(&self, question: &str, answer: &str) -> Result<Vec<String>, DomainError>;

    fn extractor_name(&self) -> &'static str;
}

/// Sentence segmentation: nothing for insufficient-evidence answers, otherwise
/// the first `max_claims` non-empty sentences
pub fn sentence_claims(answer: &str, max_claims: usize) -> Vec<String> {
    let cleaned = answer.trim();
    if cleaned.is_empty() || signals_insufficient_evidence(cleaned) {
        return Vec::new();
    }
    split_sentences(cleaned)
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(max_claims)
        .map(String::from)
        .collect()
}
