//! Query service - answers questions and verifies the answer against its sources

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::generation::enforce_grounded_answer;
use crate::domain::verification::{
    build_citation_groups, build_citations, rewrite_verified_answer, summarize_claims, Citation,
    CitationGroup, Claim, ClaimHighlight, PlainAnswer, VerificationSummary,
};
use crate::domain::{
    AnswerGenerator, AnswerPayload, AnswerRepository, ClaimExtractor, ClaimVerifier, DomainError,
    EvidenceHighlighter, RetrievedChunk, StoredAnswer, VerifiedAnswer,
};
use crate::infrastructure::services::{RetrievalScope, RetrievalService};

/// A question to answer
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub question: String,
    /// Restrict retrieval to these sources; empty means every source
    pub source_ids: Vec<Uuid>,
    /// Group citations by source and retrieve per source
    pub grouped: bool,
}

impl QueryRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    pub fn with_sources(mut self, source_ids: Vec<Uuid>) -> Self {
        self.source_ids = source_ids;
        self
    }

    pub fn grouped(mut self, grouped: bool) -> Self {
        self.grouped = grouped;
        self
    }
}

/// A response together with the ids it was stored under
#[derive(Debug, Clone)]
pub struct QueryOutcome<T> {
    pub query_id: Uuid,
    pub answer_id: Uuid,
    pub response: T,
}

/// Collaborators of the query pipeline
#[derive(Clone)]
pub struct QueryServiceDeps {
    pub retrieval: Arc<RetrievalService>,
    pub generator: Arc<dyn AnswerGenerator>,
    pub extractor: Arc<dyn ClaimExtractor>,
    pub verifier: Arc<dyn ClaimVerifier>,
    pub highlighter: Arc<dyn EvidenceHighlighter>,
    pub answers: Arc<dyn AnswerRepository>,
}

/// Everything a verified query produced before it is shaped into a response
struct VerifiedRun {
    query_id: Uuid,
    chunks: Vec<RetrievedChunk>,
    answer: String,
    cited_ids: Vec<Uuid>,
    citations: Vec<Citation>,
    groups: Option<Vec<CitationGroup>>,
    claims: Vec<Claim>,
    summary: VerificationSummary,
}

/// Runs retrieval, generation, verification and persistence for one question
pub struct QueryService {
    deps: QueryServiceDeps,
}

impl std::fmt::Debug for QueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService")
            .field("generator", &self.deps.generator.generator_name())
            .field("extractor", &self.deps.extractor.extractor_name())
            .field("verifier", &self.deps.verifier.verifier_name())
            .field("highlighter", &self.deps.highlighter.highlighter_name())
            .finish()
    }
}

impl QueryService {
    pub fn new(deps: QueryServiceDeps) -> Self {
        Self { deps }
    }

    /// Answer with citations, without claim verification
    pub async fn answer_question(
        &self,
        request: &QueryRequest,
    ) -> Result<QueryOutcome<PlainAnswer>, DomainError> {
        let question = Self::validate(request)?;
        let chunks = self.retrieve(question, request).await?;
        let query_id = Uuid::new_v4();

        info!(
            query_id = %query_id,
            source_ids = ?request.source_ids,
            grouped = request.grouped,
            "query_received"
        );

        let generated = enforce_grounded_answer(self.deps.generator.generate(question, &chunks).await?);
        let citations = build_citations(&generated.cited_ids, &chunks);
        let groups = request.grouped.then(|| build_citation_groups(&citations));

        let payload = AnswerPayload::new(generated.cited_ids.clone(), citations.clone())
            .with_groups(groups.clone());
        let stored = self
            .persist(query_id, question, &generated.answer, &payload)
            .await?;

        info!(
            query_id = %query_id,
            citations_count = citations.len(),
            answer_length = generated.answer.chars().count(),
            "query_completed"
        );

        Ok(QueryOutcome {
            query_id,
            answer_id: stored.id,
            response: PlainAnswer {
                answer: generated.answer,
                citations,
                citation_groups: groups,
            },
        })
    }

    /// Answer with per-claim verdicts and a verification summary
    pub async fn query_verified(
        &self,
        request: &QueryRequest,
    ) -> Result<QueryOutcome<VerifiedAnswer<Claim>>, DomainError> {
        let question = Self::validate(request)?;
        let run = self.run_verified(question, request).await?;

        let payload = AnswerPayload::new(run.cited_ids.clone(), run.citations.clone())
            .with_groups(run.groups.clone())
            .with_claims(run.claims.clone())
            .with_summary(run.summary.clone());
        let stored = self.persist(run.query_id, question, &run.answer, &payload).await?;
        Self::log_completed(&run);

        let query_id = run.query_id;
        let response = Self::respond(run.answer, run.citations, run.groups, run.claims, run.summary)?;
        Ok(QueryOutcome {
            query_id,
            answer_id: stored.id,
            response,
        })
    }

    /// Verified answer whose evidence carries highlight spans
    pub async fn query_verified_highlights(
        &self,
        request: &QueryRequest,
    ) -> Result<QueryOutcome<VerifiedAnswer<ClaimHighlight>>, DomainError> {
        let question = Self::validate(request)?;
        let run = self.run_verified(question, request).await?;
        let highlights = self
            .deps
            .highlighter
            .highlight(question, &run.claims, &run.chunks)
            .await?;

        let payload = AnswerPayload::new(run.cited_ids.clone(), run.citations.clone())
            .with_groups(run.groups.clone())
            .with_claims(run.claims.clone())
            .with_highlights(highlights.clone())
            .with_summary(run.summary.clone());
        let stored = self.persist(run.query_id, question, &run.answer, &payload).await?;
        Self::log_completed(&run);

        let query_id = run.query_id;
        let response = Self::respond(run.answer, run.citations, run.groups, highlights, run.summary)?;
        Ok(QueryOutcome {
            query_id,
            answer_id: stored.id,
            response,
        })
    }

    fn validate(request: &QueryRequest) -> Result<&str, DomainError> {
        let question = request.question.trim();
        if question.is_empty() {
            return Err(DomainError::validation("Question cannot be empty"));
        }
        Ok(question)
    }

    async fn retrieve(
        &self,
        question: &str,
        request: &QueryRequest,
    ) -> Result<Vec<RetrievedChunk>, DomainError> {
        let scope = RetrievalScope::sources(request.source_ids.clone()).per_source(request.grouped);
        self.deps.retrieval.retrieve(question, &scope).await
    }

    async fn run_verified(
        &self,
        question: &str,
        request: &QueryRequest,
    ) -> Result<VerifiedRun, DomainError> {
        let chunks = self.retrieve(question, request).await?;
        let query_id = Uuid::new_v4();

        info!(
            query_id = %query_id,
            source_ids = ?request.source_ids,
            grouped = request.grouped,
            "query_verified_received"
        );

        let generated = enforce_grounded_answer(self.deps.generator.generate(question, &chunks).await?);
        let citations = build_citations(&generated.cited_ids, &chunks);
        let groups = request.grouped.then(|| build_citation_groups(&citations));

        let claim_texts = self.deps.extractor.extract(question, &generated.answer).await?;
        let claims = if claim_texts.is_empty() {
            Vec::new()
        } else {
            self.deps
                .verifier
                .verify(question, &claim_texts, &chunks, &generated.cited_ids)
                .await?
        };

        let mut summary = summarize_claims(&claims, &generated.answer, citations.len());
        let (answer, _) = rewrite_verified_answer(&generated.answer, &claims, &mut summary);

        Ok(VerifiedRun {
            query_id,
            chunks,
            answer,
            cited_ids: generated.cited_ids,
            citations,
            groups,
            claims,
            summary,
        })
    }

    fn respond<C>(
        answer: String,
        citations: Vec<Citation>,
        groups: Option<Vec<CitationGroup>>,
        claims: Vec<C>,
        summary: VerificationSummary,
    ) -> Result<VerifiedAnswer<C>, DomainError> {
        let mut response = VerifiedAnswer::new(answer, summary.answer_style, citations, claims, summary)?;
        response.citation_groups = groups;
        Ok(response)
    }

    async fn persist(
        &self,
        query_id: Uuid,
        question: &str,
        answer: &str,
        payload: &AnswerPayload,
    ) -> Result<StoredAnswer, DomainError> {
        let mut record = StoredAnswer::new(question, answer, payload.to_value()?);
        record.query_id = query_id;
        self.deps.answers.save(record).await
    }

    fn log_completed(run: &VerifiedRun) {
        info!(
            query_id = %run.query_id,
            citations_count = run.citations.len(),
            claims_count = run.claims.len(),
            answer_length = run.answer.chars().count(),
            overall_verdict = %run.summary.overall_verdict,
            "query_verified_completed"
        );
    }
}
