//! Chunk store backed by rows held in memory (CLI candidate files, tests)

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::retrieval::{
    ChunkRetrievalProvider, LexicalMatch, RetrievalQuery, RetrievedChunk, VectorMatch,
};
use crate::domain::text::token_set;
use crate::domain::DomainError;

/// One stored chunk plus optional precomputed signals
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateRow {
    #[serde(flatten)]
    pub chunk: RetrievedChunk,
    /// Cosine distance to the question; computed from `embedding` when absent
    #[serde(default)]
    pub distance: Option<f64>,
    /// Full-text rank; computed from token overlap when absent
    #[serde(default)]
    pub rank: Option<f64>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl CandidateRow {
    pub fn new(chunk: RetrievedChunk) -> Self {
        Self {
            chunk,
            distance: None,
            rank: None,
            embedding: None,
        }
    }

    fn distance_to(&self, query: &[f32]) -> Option<f64> {
        self.distance
            .or_else(|| self.embedding.as_deref().and_then(|e| cosine_distance(e, query)))
    }

    fn rank_for(&self, question: &str) -> Option<f64> {
        self.rank.or_else(|| {
            let question_tokens = token_set(question);
            if question_tokens.is_empty() {
                return None;
            }
            let chunk_tokens = token_set(&self.chunk.text);
            let hits = question_tokens.intersection(&chunk_tokens).count();
            (hits > 0).then(|| hits as f64 / question_tokens.len() as f64)
        })
    }
}

/// Provider answering both retrieval streams from an in-memory row list
#[derive(Debug, Default)]
pub struct InMemoryChunkRetrievalProvider {
    rows: Vec<CandidateRow>,
}

impl InMemoryChunkRetrievalProvider {
    pub fn new(rows: Vec<CandidateRow>) -> Self {
        Self { rows }
    }

    /// Load rows from a JSON array file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::storage(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, DomainError> {
        let rows: Vec<CandidateRow> = serde_json::from_str(content)
            .map_err(|e| DomainError::validation(format!("Invalid candidate rows: {}", e)))?;
        Ok(Self::new(rows))
    }

    fn scoped<'a>(&'a self, query: &'a RetrievalQuery) -> impl Iterator<Item = &'a CandidateRow> {
        self.rows.iter().filter(move |row| {
            query.source_ids.is_empty() || query.source_ids.contains(&row.chunk.source_id)
        })
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(1.0 - dot / (norm_a * norm_b))
}

#[async_trait]
impl ChunkRetrievalProvider for InMemoryChunkRetrievalProvider {
    async fn vector_search(&self, query: &RetrievalQuery) -> Result<Vec<VectorMatch>, DomainError> {
        let mut matches: Vec<VectorMatch> = self
            .scoped(query)
            .filter_map(|row| {
                row.distance_to(&query.embedding).map(|distance| VectorMatch {
                    chunk: row.chunk.clone(),
                    distance,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(query.limit);
        Ok(matches)
    }

    async fn lexical_search(
        &self,
        query: &RetrievalQuery,
    ) -> Result<Vec<LexicalMatch>, DomainError> {
        let mut matches: Vec<LexicalMatch> = self
            .scoped(query)
            .filter_map(|row| {
                row.rank_for(&query.question).map(|rank| LexicalMatch {
                    chunk: row.chunk.clone(),
                    rank,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.rank.partial_cmp(&a.rank).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(query.limit);
        Ok(matches)
    }

    fn provider_name(&self) -> &'static str {
        "in_memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn row(source: Uuid, text: &str) -> CandidateRow {
        CandidateRow::new(RetrievedChunk::new(Uuid::new_v4(), source, text))
    }

    #[tokio::test]
    async fn test_vector_search_orders_by_distance() {
        let source = Uuid::new_v4();
        let mut near = row(source, "near");
        near.distance = Some(0.1);
        let mut far = row(source, "far");
        far.embedding = Some(vec![0.0, 1.0]);
        let no_signal = row(source, "nothing");

        let provider = InMemoryChunkRetrievalProvider::new(vec![far, no_signal, near]);
        let query = RetrievalQuery::new("q", vec![1.0, 0.0], 10);
        let matches = provider.vector_search(&query).await.unwrap();

        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].chunk.text, "near");
        assert!((matches[1].distance - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_lexical_search_uses_token_overlap() {
        let source = Uuid::new_v4();
        let provider = InMemoryChunkRetrievalProvider::new(vec![
            row(source, "Refunds take ten days."),
            row(source, "The late fee is 25 dollars."),
            row(source, "Unrelated text."),
        ]);

        let query = RetrievalQuery::new("What is the late fee?", vec![], 10);
        let matches = provider.lexical_search(&query).await.unwrap();

        assert_eq!(matches[0].chunk.text, "The late fee is 25 dollars.");
        assert!(matches.iter().all(|m| m.chunk.text != "Unrelated text."));
    }

    #[tokio::test]
    async fn test_source_filter_and_limit() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rows = vec![row(a, "fee a"), row(b, "fee b"), row(a, "fee a2")];
        for r in rows.iter_mut() {
            r.distance = Some(0.2);
        }
        let provider = InMemoryChunkRetrievalProvider::new(rows);

        let query = RetrievalQuery::new("fee", vec![], 1).with_sources(vec![b]);
        let matches = provider.vector_search(&query).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].chunk.source_id, b);
    }

    #[test]
    fn test_from_json() {
        let raw = serde_json::json!([{
            "chunk_id": Uuid::nil().to_string(),
            "source_id": Uuid::nil().to_string(),
            "source_title": "Policy",
            "text": "Fee is 25.",
            "distance": 0.3
        }]);
        let provider = InMemoryChunkRetrievalProvider::from_json(&raw.to_string()).unwrap();
        assert_eq!(provider.rows.len(), 1);
        assert_eq!(provider.rows[0].distance, Some(0.3));
        assert_eq!(provider.rows[0].chunk.source_title.as_deref(), Some("Policy"));

        assert!(InMemoryChunkRetrievalProvider::from_json("{}").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let raw = format!(
            r#"[{{"chunk_id": "{}", "source_id": "{}", "text": "Fee is 25.", "rank": 0.5}}]"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        std::io::Write::write_all(&mut file, raw.as_bytes()).unwrap();

        let provider = InMemoryChunkRetrievalProvider::from_file(file.path()).unwrap();
        assert_eq!(provider.rows[0].rank, Some(0.5));

        let missing = InMemoryChunkRetrievalProvider::from_file("/nonexistent/rows.json");
        assert!(matches!(missing, Err(DomainError::Storage { .. })));
    }

    #[test]
    fn test_cosine_distance_edge_cases() {
        assert!(cosine_distance(&[1.0], &[1.0, 2.0]).is_none());
        assert!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]).is_none());
        assert!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]).unwrap().abs() < 1e-9);
    }
}
