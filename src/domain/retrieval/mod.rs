//! Hybrid retrieval: candidate rows, score fusion, diversity and relevance reranking

mod chunk;
mod diversity;
mod fusion;
mod provider;
mod rerank;

pub use chunk::{LexicalMatch, RetrievedChunk, VectorMatch};
pub use diversity::{apply_diversity, DiversityConfig};
pub use fusion::{fuse_candidates, sort_by_score_desc};
pub use provider::{ChunkRetrievalProvider, RetrievalQuery};
pub use rerank::{clean_snippet, rerank_chunks, RelevanceScorer, RerankConfig};

#[cfg(test)]
pub use provider::mock::MockRetrievalProvider;
#[cfg(test)]
pub use rerank::mock::MockRelevanceScorer;
