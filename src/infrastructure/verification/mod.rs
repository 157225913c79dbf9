//! Claim extraction, verification and highlighting implementations

mod lexical_verifier;
mod llm_extractor;
mod llm_highlighter;
mod llm_verifier;
mod sentence_extractor;
mod token_highlighter;

pub use lexical_verifier::LexicalClaimVerifier;
pub use llm_extractor::LlmClaimExtractor;
pub use llm_highlighter::{parse_spans, LlmEvidenceHighlighter};
pub use llm_verifier::{filter_ids, LlmClaimVerifier};
pub use sentence_extractor::SentenceClaimExtractor;
pub use token_highlighter::TokenWindowHighlighter;
