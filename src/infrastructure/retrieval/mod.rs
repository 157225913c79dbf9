//! Chunk retrieval provider implementations

mod in_memory;
mod pgvector;

pub use in_memory::{CandidateRow, InMemoryChunkRetrievalProvider};
pub use pgvector::{embedding_literal, PgChunkRetrievalProvider};
