//! Embedding provider implementations

mod hash;
mod openai;
mod retry;

pub use hash::HashEmbeddingProvider;
pub use openai::OpenAiEmbeddingProvider;
pub use retry::{RetryPolicy, RetryingEmbeddingProvider};
