//! Offline claim extraction by sentence segmentation

use async_trait::async_trait;

use crate::domain::verification::{sentence_claims, ClaimExtractor};
use crate::domain::DomainError;

/// Treats each answer sentence as a claim, up to a fixed cap
#[derive(Debug)]
pub struct SentenceClaimExtractor {
    max_claims: usize,
}

impl SentenceClaimExtractor {
    pub fn new(max_claims: usize) -> Self {
        Self { max_claims }
    }
}

#[async_trait]
impl ClaimExtractor for SentenceClaimExtractor {
    async fn extract(&self, _question: &str, answer: &str) -> Result<Vec<String>, DomainError> {
        Ok(sentence_claims(answer, self.max_claims))
    }

    fn extractor_name(&self) -> &'static str {
        "sentence"
    }
}
