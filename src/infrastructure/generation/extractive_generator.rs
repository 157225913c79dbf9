//! Offline answer generation from the top retrieved chunks

use async_trait::async_trait;

use crate::domain::generation::{AnswerGenerator, GeneratedAnswer, NO_CONTEXT_ANSWER};
use crate::domain::retrieval::RetrievedChunk;
use crate::domain::text::split_sentences;
use crate::domain::DomainError;

const SOURCE_CHUNKS: usize = 2;

/// Answers with the first sentence of each of the top chunks and cites them
#[derive(Debug, Default)]
pub struct ExtractiveAnswerGenerator;

impl ExtractiveAnswerGenerator {
    pub fn new() -> Self {
        Self
    }
}

fn first_sentence(text: &str) -> Option<&str> {
    split_sentences(text.trim())
        .into_iter()
        .map(str::trim)
        .find(|s| !s.is_empty())
}

#[async_trait]
impl AnswerGenerator for ExtractiveAnswerGenerator {
    async fn generate(
        &self,
        _question: &str,
        chunks: &[RetrievedChunk],
    ) -> Result<GeneratedAnswer, DomainError> {
        let mut sentences = Vec::new();
        let mut cited_ids = Vec::new();

        for chunk in chunks.iter().take(SOURCE_CHUNKS) {
            if let Some(sentence) = first_sentence(&chunk.text) {
                sentences.push(sentence);
                cited_ids.push(chunk.chunk_id);
            }
        }

        if sentences.is_empty() {
            return Ok(GeneratedAnswer::uncited(NO_CONTEXT_ANSWER));
        }

        Ok(GeneratedAnswer::new(sentences.join(" "), cited_ids))
    }

    fn generator_name(&self) -> &'static str {
        "extractive"
    }
}
