//! Answer generator implementations

mod extractive_generator;
mod llm_generator;

pub use extractive_generator::ExtractiveAnswerGenerator;
pub use llm_generator::LlmAnswerGenerator;
