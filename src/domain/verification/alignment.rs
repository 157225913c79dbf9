//! Claim verification seam and the evidence-list helpers shared by verifiers

use async_trait::async_trait;
use std::collections::HashSet;
use std::fmt::Debug;
use uuid::Uuid;

use super::citation::{build_snippet, compute_absolute_offsets, SNIPPET_MAX_CHARS};
use super::{Claim, Evidence, EvidenceRelation, VerificationConfig};
use crate::domain::retrieval::RetrievedChunk;
use crate::domain::DomainError;

/// Aligns claims with supporting and contradicting chunks
#[async_trait]
pub trait ClaimVerifier: Send + Sync + Debug {
    /// One output claim per input text, in order. `cited_ids` are preferred
    /// when ordering evidence.
    async fn verify(
        &self,
        question: &str,
        claim_texts: &[String],
        chunks: &[RetrievedChunk],
        cited_ids: &[Uuid],
    ) -> Result<Vec<Claim>, DomainError>;

    fn verifier_name(&self) -> &'static str;
}

/// Stable partition putting preferred ids first
pub fn prioritize_ids(ids: Vec<Uuid>, preferred: &HashSet<Uuid>) -> Vec<Uuid> {
    if preferred.is_empty() {
        return ids;
    }
    let (mut first, rest): (Vec<Uuid>, Vec<Uuid>) =
        ids.into_iter().partition(|id| preferred.contains(id));
    first.extend(rest);
    first
}

/// Bounded evidence list: supporting chunks first, then contradicting ones
pub fn build_evidence(
    chunks: &[RetrievedChunk],
    support_ids: &[Uuid],
    contradict_ids: &[Uuid],
    config: &VerificationConfig,
) -> Vec<Evidence> {
    let supports = support_ids
        .iter()
        .take(config.max_support_evidence)
        .map(|id| (id, EvidenceRelation::Supports));
    let contradicts = contradict_ids
        .iter()
        .take(config.max_contradict_evidence)
        .map(|id| (id, EvidenceRelation::Contradicts));

    supports
        .chain(contradicts)
        .filter_map(|(id, relation)| {
            chunks
                .iter()
                .find(|c| c.chunk_id == *id)
                .map(|chunk| evidence_for(chunk, relation))
        })
        .collect()
}

fn evidence_for(chunk: &RetrievedChunk, relation: EvidenceRelation) -> Evidence {
    let snippet = build_snippet(&chunk.text, SNIPPET_MAX_CHARS);
    let (absolute_start, absolute_end) = compute_absolute_offsets(chunk, snippet.start, snippet.end);
    Evidence {
        chunk_id: chunk.chunk_id,
        relation,
        snippet: snippet.text,
        snippet_start: snippet.start,
        snippet_end: snippet.end,
        absolute_start,
        absolute_end,
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Verifier returning pre-scored claims by text, UNSUPPORTED otherwise
    #[derive(Debug, Default)]
    pub struct MockClaimVerifier {
        scores: Vec<(String, f64, f64)>,
    }

    impl MockClaimVerifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_scores(mut self, claim: impl Into<String>, support: f64, contradiction: f64) -> Self {
            self.scores.push((claim.into(), support, contradiction));
            self
        }
    }

    #[async_trait]
    impl ClaimVerifier for MockClaimVerifier {
        async fn verify(
            &self,
            _question: &str,
            claim_texts: &[String],
            _chunks: &[RetrievedChunk],
            _cited_ids: &[Uuid],
        ) -> Result<Vec<Claim>, DomainError> {
            Ok(claim_texts
                .iter()
                .map(|text| match self.scores.iter().find(|(t, _, _)| t == text) {
                    Some((_, s, c)) => Claim::scored(text.clone(), *s, *c, vec![]),
                    None => Claim::unsupported(text.clone()),
                })
                .collect())
        }

        fn verifier_name(&self) -> &'static str {
            "mock"
        }
    }
}
