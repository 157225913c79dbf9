//! Relevance scorer implementations

mod hash_scorer;
mod llm_scorer;

pub use hash_scorer::{hash_score, HashRelevanceScorer};
pub use llm_scorer::{parse_scores, LlmRelevanceScorer};
