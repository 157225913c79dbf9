//! Chunk retrieval provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;
use uuid::Uuid;

use super::{LexicalMatch, VectorMatch};
use crate::domain::DomainError;

/// Parameters for one retrieval stream
#[derive(Debug, Clone)]
pub struct RetrievalQuery {
    pub question: String,
    pub embedding: Vec<f32>,
    /// Restrict to these sources; empty means no filter
    pub source_ids: Vec<Uuid>,
    pub limit: usize,
}

impl RetrievalQuery {
    pub fn new(question: impl Into<String>, embedding: Vec<f32>, limit: usize) -> Self {
        Self {
            question: question.into(),
            embedding,
            source_ids: Vec::new(),
            limit,
        }
    }

    pub fn with_sources(mut self, source_ids: Vec<Uuid>) -> Self {
        self.source_ids = source_ids;
        self
    }
}

/// Store that owns the vector index and full-text index over chunks
#[async_trait]
pub trait ChunkRetrievalProvider: Send + Sync + Debug {
    /// Rows ordered by ascending cosine distance, capped at `query.limit`
    async fn vector_search(&self, query: &RetrievalQuery) -> Result<Vec<VectorMatch>, DomainError>;

    /// Rows matching the question's text query, ordered by descending rank
    async fn lexical_search(&self, query: &RetrievalQuery)
    -> Result<Vec<LexicalMatch>, DomainError>;

    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Returns fixed rows, filtered by source ids and truncated to the limit
    #[derive(Debug, Default)]
    pub struct MockRetrievalProvider {
        vector: Vec<VectorMatch>,
        lexical: Vec<LexicalMatch>,
        error: Option<String>,
        queries: Mutex<Vec<RetrievalQuery>>,
    }

    impl MockRetrievalProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_vector(mut self, rows: Vec<VectorMatch>) -> Self {
            self.vector = rows;
            self
        }

        pub fn with_lexical(mut self, rows: Vec<LexicalMatch>) -> Self {
            self.lexical = rows;
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn queries(&self) -> Vec<RetrievalQuery> {
            self.queries.lock().unwrap().clone()
        }

        fn allowed(query: &RetrievalQuery, source_id: &Uuid) -> bool {
            query.source_ids.is_empty() || query.source_ids.contains(source_id)
        }
    }

    #[async_trait]
    impl ChunkRetrievalProvider for MockRetrievalProvider {
        async fn vector_search(
            &self,
            query: &RetrievalQuery,
        ) -> Result<Vec<VectorMatch>, DomainError> {
            self.queries.lock().unwrap().push(query.clone());
            if let Some(ref error) = self.error {
                return Err(DomainError::storage(error.clone()));
            }
            Ok(self
                .vector
                .iter()
                .filter(|row| Self::allowed(query, &row.chunk.source_id))
                .take(query.limit)
                .cloned()
                .collect())
        }

        async fn lexical_search(
            &self,
            query: &RetrievalQuery,
        ) -> Result<Vec<LexicalMatch>, DomainError> {
            if let Some(ref error) = self.error {
                return Err(DomainError::storage(error.clone()));
            }
            Ok(self
                .lexical
                .iter()
                .filter(|row| Self::allowed(query, &row.chunk.source_id))
                .take(query.limit)
                .cloned()
                .collect())
        }

        fn provider_name(&self) -> &'static str {
            "mock"
        }
    }
}
