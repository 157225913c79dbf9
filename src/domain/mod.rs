//! Domain layer - Core types, policies and collaborator traits

pub mod answer;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod llm;
pub mod retrieval;
pub mod text;
pub mod verification;

pub use answer::{AnswerPayload, AnswerRepository, StoredAnswer};
pub use embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
pub use error::DomainError;
pub use generation::{AnswerGenerator, GeneratedAnswer};
pub use llm::{
    ChatCompletion, ChatMessage, ChatRole, LlmProvider, LlmRequest, LlmRequestBuilder, TokenUsage,
};
pub use retrieval::{ChunkRetrievalProvider, RelevanceScorer, RetrievalQuery, RetrievedChunk};
pub use verification::{
    Claim, ClaimExtractor, ClaimHighlight, ClaimVerifier, EvidenceHighlighter, VerificationSummary,
    VerifiedAnswer,
};
