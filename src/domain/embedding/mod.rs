//! Embedding provider domain models and traits

mod provider;
mod request;
mod response;

pub use provider::EmbeddingProvider;
pub use request::EmbeddingRequest;
pub use response::EmbeddingResponse;

#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
