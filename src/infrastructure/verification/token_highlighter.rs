//! Offline evidence highlighting

use async_trait::async_trait;

use crate::domain::retrieval::RetrievedChunk;
use crate::domain::verification::{
    highlight_with_token_window, Claim, ClaimHighlight, EvidenceHighlighter,
};
use crate::domain::DomainError;

/// Highlights evidence with the token-window heuristic only
#[derive(Debug, Default)]
pub struct TokenWindowHighlighter;

impl TokenWindowHighlighter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EvidenceHighlighter for TokenWindowHighlighter {
    async fn highlight(
        &self,
        _question: &str,
        claims: &[Claim],
        chunks: &[RetrievedChunk],
    ) -> Result<Vec<ClaimHighlight>, DomainError> {
        Ok(highlight_with_token_window(claims, chunks))
    }

    fn highlighter_name(&self) -> &'static str {
        "token_window"
    }
}
