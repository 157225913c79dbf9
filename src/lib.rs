//! Grounded RAG
//!
//! Question answering over uploaded documents with:
//! - Hybrid vector + lexical retrieval, relevance reranking and MMR diversity
//! - Citation-constrained answer generation
//! - Claim extraction and verification against the retrieved evidence
//! - Verification summaries that are re-derived whenever an answer is read

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use config::{AiProvider, DatabaseConfig};
use domain::{
    AnswerGenerator, AnswerRepository, ChunkRetrievalProvider, ClaimExtractor, ClaimVerifier,
    DomainError, EmbeddingProvider, EvidenceHighlighter, LlmProvider, RelevanceScorer,
};
use infrastructure::{
    embedding::{HashEmbeddingProvider, OpenAiEmbeddingProvider, RetryPolicy, RetryingEmbeddingProvider},
    generation::{ExtractiveAnswerGenerator, LlmAnswerGenerator},
    llm::{ChatClient, OpenAiProvider, ReqwestTransport},
    rerank::{HashRelevanceScorer, LlmRelevanceScorer},
    retrieval::{InMemoryChunkRetrievalProvider, PgChunkRetrievalProvider},
    services::{AnswerService, QueryService, QueryServiceDeps, RetrievalService, RetrievalSettings},
    verification::{
        LexicalClaimVerifier, LlmClaimExtractor, LlmClaimVerifier, LlmEvidenceHighlighter,
        SentenceClaimExtractor, TokenWindowHighlighter,
    },
};
use tracing::info;

/// Services behind every entry point
#[derive(Debug, Clone)]
pub struct AppState {
    pub queries: Arc<QueryService>,
    pub answers: Arc<AnswerService>,
}

/// Pipeline collaborators for one operating mode
struct Collaborators {
    embedder: Arc<dyn EmbeddingProvider>,
    scorer: Arc<dyn RelevanceScorer>,
    generator: Arc<dyn AnswerGenerator>,
    extractor: Arc<dyn ClaimExtractor>,
    verifier: Arc<dyn ClaimVerifier>,
    highlighter: Arc<dyn EvidenceHighlighter>,
}

/// Chunk store for queries: Postgres when `database.url` is set, else a candidates file
pub fn create_chunk_store(
    database: &DatabaseConfig,
    candidates: Option<&Path>,
) -> Result<Arc<dyn ChunkRetrievalProvider>, DomainError> {
    let url = database.url.as_deref().filter(|u| !u.trim().is_empty());

    match (url, candidates) {
        (Some(url), _) => {
            info!(max_connections = database.max_connections, "Using PostgreSQL chunk store");
            Ok(Arc::new(PgChunkRetrievalProvider::connect_lazy(
                url,
                database.max_connections,
            )?))
        }
        (None, Some(path)) => {
            info!(path = %path.display(), "Using in-memory chunk store");
            Ok(Arc::new(InMemoryChunkRetrievalProvider::from_file(path)?))
        }
        (None, None) => Err(DomainError::configuration(
            "No chunk store configured: set database.url or pass a candidates file",
        )),
    }
}

/// Create the application state over a chunk store and an answer store
pub fn create_app_state(
    config: &AppConfig,
    store: Arc<dyn ChunkRetrievalProvider>,
    answers: Arc<dyn AnswerRepository>,
) -> Result<AppState, DomainError> {
    let provider = config.ai.provider()?;
    info!(
        provider = ?provider,
        store = store.provider_name(),
        rerank = config.rerank.enabled,
        diversity = config.diversity.enabled,
        "Creating application state"
    );

    let collaborators = match provider {
        AiProvider::Fake => create_fake_collaborators(config)?,
        AiProvider::OpenAi => create_openai_collaborators(config)?,
    };

    let settings = RetrievalSettings {
        retrieval: config.retrieval.clone(),
        rerank: config.rerank.clone(),
        diversity: config.diversity.clone(),
    };
    let retrieval = Arc::new(RetrievalService::new(
        store,
        collaborators.embedder,
        collaborators.scorer,
        config.ai.embed_model.clone(),
        settings,
    ));

    let queries = QueryService::new(QueryServiceDeps {
        retrieval,
        generator: collaborators.generator,
        extractor: collaborators.extractor,
        verifier: collaborators.verifier,
        highlighter: collaborators.highlighter,
        answers: answers.clone(),
    });

    Ok(AppState {
        queries: Arc::new(queries),
        answers: Arc::new(AnswerService::new(answers)),
    })
}

fn create_fake_collaborators(config: &AppConfig) -> Result<Collaborators, DomainError> {
    info!("Using deterministic offline collaborators");
    let embedder = HashEmbeddingProvider::new(config.ai.fake_embedding_dim)?;

    Ok(Collaborators {
        embedder: Arc::new(embedder),
        scorer: Arc::new(HashRelevanceScorer::new()),
        generator: Arc::new(ExtractiveAnswerGenerator::new()),
        extractor: Arc::new(SentenceClaimExtractor::new(config.verification.max_fake_claims)),
        verifier: Arc::new(LexicalClaimVerifier::new(config.verification.clone())),
        highlighter: Arc::new(TokenWindowHighlighter::new()),
    })
}

fn create_openai_collaborators(config: &AppConfig) -> Result<Collaborators, DomainError> {
    let api_key = config.ai.resolve_api_key()?;
    let client = ReqwestTransport::with_timeout(Duration::from_secs(config.ai.request_timeout_secs))?;

    let (llm, embedder): (Arc<dyn LlmProvider>, Arc<dyn EmbeddingProvider>) =
        match &config.ai.base_url {
            Some(url) => {
                info!("Using OpenAI provider with custom base URL: {}", url);
                (
                    Arc::new(OpenAiProvider::with_base_url(client.clone(), api_key.clone(), url.clone())),
                    Arc::new(OpenAiEmbeddingProvider::with_base_url(client, api_key, url.clone())),
                )
            }
            None => {
                info!("Using OpenAI provider with default base URL");
                (
                    Arc::new(OpenAiProvider::new(client.clone(), api_key.clone())),
                    Arc::new(OpenAiEmbeddingProvider::new(client, api_key)),
                )
            }
        };

    let policy = RetryPolicy::new(
        config.ai.embed_max_attempts,
        Duration::from_millis(config.ai.embed_backoff_min_ms),
        Duration::from_millis(config.ai.embed_backoff_max_ms),
    );
    let chat = ChatClient::new(llm, config.ai.model.clone());

    Ok(Collaborators {
        embedder: Arc::new(RetryingEmbeddingProvider::new(embedder, policy)),
        scorer: Arc::new(LlmRelevanceScorer::new(chat.clone())),
        generator: Arc::new(LlmAnswerGenerator::new(chat.clone())),
        extractor: Arc::new(LlmClaimExtractor::new(chat.clone())),
        verifier: Arc::new(LlmClaimVerifier::new(chat.clone(), config.verification.clone())),
        highlighter: Arc::new(LlmEvidenceHighlighter::new(chat, config.verification.clone())),
    })
}
