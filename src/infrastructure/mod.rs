//! Infrastructure layer - External service implementations

pub mod answer;
pub mod embedding;
pub mod generation;
pub mod llm;
pub mod observability;
pub mod rerank;
pub mod retrieval;
pub mod services;
pub mod verification;
