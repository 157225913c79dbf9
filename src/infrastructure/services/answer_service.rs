//! Answer service - reads stored answers back into responses

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::domain::answer::{hydrate_highlights, hydrate_plain, hydrate_verified, Hydrated};
use crate::domain::verification::{Claim, ClaimHighlight, PlainAnswer};
use crate::domain::{AnswerRepository, DomainError, StoredAnswer, VerifiedAnswer};
use crate::infrastructure::observability::record_summary_inconsistent;

/// Hydrates stored answers, recomputing their verification summaries
#[derive(Debug)]
pub struct AnswerService {
    answers: Arc<dyn AnswerRepository>,
    inconsistent_reads: AtomicU64,
}

impl AnswerService {
    pub fn new(answers: Arc<dyn AnswerRepository>) -> Self {
        Self {
            answers,
            inconsistent_reads: AtomicU64::new(0),
        }
    }

    /// Verified answer with plain claims
    pub async fn get_answer(&self, id: Uuid, grouped: bool) -> Result<VerifiedAnswer<Claim>, DomainError> {
        let record = self.load(id).await?;
        let hydrated = hydrate_verified(&record, grouped)?;
        Ok(self.report(&record, hydrated))
    }

    /// Verified answer with highlighted claims
    pub async fn get_answer_highlights(
        &self,
        id: Uuid,
        grouped: bool,
    ) -> Result<VerifiedAnswer<ClaimHighlight>, DomainError> {
        let record = self.load(id).await?;
        let hydrated = hydrate_highlights(&record, grouped)?;
        Ok(self.report(&record, hydrated))
    }

    /// Answer with citations only
    pub async fn get_plain_answer(&self, id: Uuid, grouped: bool) -> Result<PlainAnswer, DomainError> {
        let record = self.load(id).await?;
        Ok(hydrate_plain(&record, grouped))
    }

    /// Reads whose stored summary disagreed with the recomputed one
    pub fn inconsistent_reads(&self) -> u64 {
        self.inconsistent_reads.load(Ordering::Relaxed)
    }

    async fn load(&self, id: Uuid) -> Result<StoredAnswer, DomainError> {
        self.answers
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Answer {} not found", id)))
    }

    fn report<C>(&self, record: &StoredAnswer, hydrated: Hydrated<C>) -> VerifiedAnswer<C> {
        if !hydrated.inconsistencies.is_empty() {
            warn!(
                answer_id = %record.id,
                query_id = %record.query_id,
                reasons = ?hydrated.inconsistencies,
                "verification_summary_inconsistent"
            );
            record_summary_inconsistent();
            self.inconsistent_reads.fetch_add(1, Ordering::Relaxed);
        }
        hydrated.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::answer::MockAnswerRepository;
    use crate::domain::verification::{AnswerStyle, OverallVerdict};
    use serde_json::json;

    fn stale_record() -> StoredAnswer {
        StoredAnswer::new(
            "What is the fee?",
            "The fee is 25 dollars.",
            json!({
                "ids": [Uuid::new_v4().to_string()],
                "claims": [
                    {"claim_text": "The fee is 25 dollars.", "verdict": "SUPPORTED",
                     "support_score": 0.9, "contradiction_score": 0.0, "evidence": []},
                    {"claim_text": "The fee is 30 dollars.", "verdict": "CONTRADICTED",
                     "support_score": 0.0, "contradiction_score": 0.8, "evidence": []}
                ],
                "verification_summary": {
                    "supported_count": 2,
                    "weak_support_count": 0,
                    "unsupported_count": 0,
                    "contradicted_count": 0,
                    "conflicting_count": 0,
                    "has_contradictions": false,
                    "overall_verdict": "OK",
                    "answer_style": "ORIGINAL"
                }
            }),
        )
    }

    #[tokio::test]
    async fn test_stale_summary_is_recomputed_and_counted() {
        let record = stale_record();
        let id = record.id;
        let service = AnswerService::new(Arc::new(MockAnswerRepository::new().with_answer(record)));

        let response = service.get_answer(id, false).await.unwrap();
        let summary = &response.verification_summary;

        assert_eq!(summary.supported_count, 1);
        assert_eq!(summary.contradicted_count, 1);
        assert!(summary.has_contradictions);
        assert_eq!(summary.overall_verdict, OverallVerdict::HasContradictions);
        assert_eq!(response.answer_style, summary.answer_style);
        assert_eq!(service.inconsistent_reads(), 1);

        service.get_answer_highlights(id, false).await.unwrap();
        assert_eq!(service.inconsistent_reads(), 2);
    }

    #[test]
    fn test_inconsistent_read_increments_counter() {
        use metrics_util::debugging::{DebugValue, DebuggingRecorder};

        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let record = stale_record();
        let id = record.id;
        let service = AnswerService::new(Arc::new(MockAnswerRepository::new().with_answer(record)));

        metrics::with_local_recorder(&recorder, || {
            tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap()
                .block_on(service.get_answer(id, false))
                .unwrap();
        });

        let counter = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .find(|(key, _, _, _)| key.key().name() == "verification_summary_inconsistent_total")
            .map(|(_, _, _, value)| value);
        assert!(matches!(counter, Some(DebugValue::Counter(1))));
    }

    #[tokio::test]
    async fn test_consistent_read_is_not_counted() {
        let record = StoredAnswer::new(
            "q",
            "The fee is 25 dollars.",
            json!({
                "ids": [Uuid::new_v4().to_string()],
                "claims": [{"claim_text": "The fee is 25 dollars.", "verdict": "SUPPORTED",
                            "support_score": 0.9, "contradiction_score": 0.0, "evidence": []}],
                "verification_summary": {
                    "supported_count": 1,
                    "has_contradictions": false,
                    "overall_verdict": "OK",
                    "answer_style": "ORIGINAL"
                }
            }),
        );
        let id = record.id;
        let service = AnswerService::new(Arc::new(MockAnswerRepository::new().with_answer(record)));

        let response = service.get_answer(id, false).await.unwrap();

        assert_eq!(response.answer_style, AnswerStyle::Original);
        assert_eq!(service.inconsistent_reads(), 0);
    }

    #[tokio::test]
    async fn test_missing_answer_is_not_found() {
        let service = AnswerService::new(Arc::new(MockAnswerRepository::new()));
        let result = service.get_answer(Uuid::new_v4(), false).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_plain_answer_reads_citations() {
        let chunk_id = Uuid::new_v4();
        let source_id = Uuid::new_v4();
        let record = StoredAnswer::new(
            "q",
            "A.",
            json!({
                "ids": [chunk_id.to_string()],
                "citations": [{"chunk_id": chunk_id.to_string(), "source_id": source_id.to_string(), "snippet": "A."}],
                "citation_groups": [{"source_id": source_id.to_string(), "citations": []}]
            }),
        );
        let id = record.id;
        let service = AnswerService::new(Arc::new(MockAnswerRepository::new().with_answer(record)));

        let plain = service.get_plain_answer(id, true).await.unwrap();

        assert_eq!(plain.answer, "A.");
        assert_eq!(plain.citations[0].chunk_id, chunk_id);
        assert_eq!(plain.citation_groups.unwrap()[0].source_id, source_id);
    }
}
