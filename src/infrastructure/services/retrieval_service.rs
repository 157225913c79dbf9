//! Retrieval service - embedding, hybrid candidate fusion, reranking and diversity

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::config::RetrievalConfig;
use crate::domain::retrieval::{
    apply_diversity, fuse_candidates, rerank_chunks, DiversityConfig, LexicalMatch, RerankConfig,
    VectorMatch,
};
use crate::domain::{
    ChunkRetrievalProvider, DomainError, EmbeddingProvider, EmbeddingRequest, RelevanceScorer,
    RetrievalQuery, RetrievedChunk,
};
use crate::infrastructure::observability::record_retrieval_candidates;

/// Tuning for every retrieval stage
#[derive(Debug, Clone, Default)]
pub struct RetrievalSettings {
    pub retrieval: RetrievalConfig,
    pub rerank: RerankConfig,
    pub diversity: DiversityConfig,
}

/// Scope of one retrieval call
#[derive(Debug, Clone, Default)]
pub struct RetrievalScope {
    /// Restrict to these sources; empty means every source
    pub source_ids: Vec<Uuid>,
    /// Query each source separately with its own cap
    pub per_source: bool,
}

impl RetrievalScope {
    pub fn sources(source_ids: Vec<Uuid>) -> Self {
        Self {
            source_ids,
            per_source: false,
        }
    }

    pub fn per_source(mut self, per_source: bool) -> Self {
        self.per_source = per_source;
        self
    }
}

/// Produces the ordered chunk list a question is answered from
pub struct RetrievalService {
    provider: Arc<dyn ChunkRetrievalProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    scorer: Arc<dyn RelevanceScorer>,
    embed_model: String,
    settings: RetrievalSettings,
}

impl std::fmt::Debug for RetrievalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalService")
            .field("provider", &self.provider.provider_name())
            .field("scorer", &self.scorer.scorer_name())
            .field("embed_model", &self.embed_model)
            .finish()
    }
}

impl RetrievalService {
    pub fn new(
        provider: Arc<dyn ChunkRetrievalProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        scorer: Arc<dyn RelevanceScorer>,
        embed_model: impl Into<String>,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            provider,
            embedder,
            scorer,
            embed_model: embed_model.into(),
            settings,
        }
    }

    /// Fused, reranked and diversified candidates, capped at
    /// `max_chunks_per_query`
    pub async fn retrieve(
        &self,
        question: &str,
        scope: &RetrievalScope,
    ) -> Result<Vec<RetrievedChunk>, DomainError> {
        let embedding = self.embed_question(question).await?;

        let (vector, lexical) = if scope.per_source && !scope.source_ids.is_empty() {
            self.search_per_source(question, &embedding, &scope.source_ids).await?
        } else {
            self.search(question, &embedding, &scope.source_ids).await?
        };

        let fused = fuse_candidates(vector, lexical);
        record_retrieval_candidates("fused", fused.len());

        let reranked = rerank_chunks(self.scorer.as_ref(), question, fused, &self.settings.rerank).await?;
        record_retrieval_candidates("reranked", reranked.len());

        let mut diversified = apply_diversity(reranked, &self.settings.diversity);
        record_retrieval_candidates("diversified", diversified.len());

        diversified.truncate(self.settings.retrieval.max_chunks_per_query);

        debug!(
            scorer = self.scorer.scorer_name(),
            chunks = diversified.len(),
            sources = scope.source_ids.len(),
            per_source = scope.per_source,
            "Retrieved chunks"
        );

        Ok(diversified)
    }

    async fn embed_question(&self, question: &str) -> Result<Vec<f32>, DomainError> {
        let request = EmbeddingRequest::single(&self.embed_model, question);
        self.embedder
            .embed(request)
            .await?
            .into_first()
            .ok_or_else(|| {
                DomainError::provider(self.embedder.provider_name(), "Embedding response was empty")
            })
    }

    async fn search(
        &self,
        question: &str,
        embedding: &[f32],
        source_ids: &[Uuid],
    ) -> Result<(Vec<VectorMatch>, Vec<LexicalMatch>), DomainError> {
        let limits = &self.settings.retrieval;
        let vector_query = RetrievalQuery::new(question, embedding.to_vec(), limits.vector_limit)
            .with_sources(source_ids.to_vec());
        let lexical_query = RetrievalQuery::new(question, embedding.to_vec(), limits.lexical_limit)
            .with_sources(source_ids.to_vec());

        let vector = self.provider.vector_search(&vector_query).await?;
        let lexical = self.provider.lexical_search(&lexical_query).await?;
        Ok((vector, lexical))
    }

    async fn search_per_source(
        &self,
        question: &str,
        embedding: &[f32],
        source_ids: &[Uuid],
    ) -> Result<(Vec<VectorMatch>, Vec<LexicalMatch>), DomainError> {
        let mut vector = Vec::new();
        let mut lexical = Vec::new();

        for source_id in source_ids {
            let query = RetrievalQuery::new(
                question,
                embedding.to_vec(),
                self.settings.retrieval.per_source_limit,
            )
            .with_sources(vec![*source_id]);

            vector.extend(self.provider.vector_search(&query).await?);
            lexical.extend(self.provider.lexical_search(&query).await?);
        }

        Ok((vector, lexical))
    }
}
