//! PostgreSQL chunk store using pgvector and full-text search

use std::fmt::Debug;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use crate::domain::retrieval::{
    ChunkRetrievalProvider, LexicalMatch, RetrievalQuery, RetrievedChunk, VectorMatch,
};
use crate::domain::DomainError;

const VECTOR_QUERY: &str = r#"
    SELECT
        c.id AS chunk_id,
        c.source_id,
        s.title AS source_title,
        c.page_start,
        c.page_end,
        c.char_start,
        c.char_end,
        c.text,
        (c.embedding <=> $1::vector)::float8 AS distance
    FROM chunks c
    JOIN sources s ON s.id = c.source_id
    WHERE (cardinality($2::uuid[]) = 0 OR c.source_id = ANY($2::uuid[]))
    ORDER BY c.embedding <=> $1::vector
    LIMIT $3
"#;

const LEXICAL_QUERY: &str = r#"
    SELECT
        c.id AS chunk_id,
        c.source_id,
        s.title AS source_title,
        c.page_start,
        c.page_end,
        c.char_start,
        c.char_end,
        c.text,
        ts_rank(c.tsv, plainto_tsquery('english', $1))::float8 AS rank
    FROM chunks c
    JOIN sources s ON s.id = c.source_id
    WHERE c.tsv @@ plainto_tsquery('english', $1)
      AND (cardinality($2::uuid[]) = 0 OR c.source_id = ANY($2::uuid[]))
    ORDER BY rank DESC
    LIMIT $3
"#;

/// Chunk retrieval over the `chunks` and `sources` tables
pub struct PgChunkRetrievalProvider {
    pool: PgPool,
}

impl Debug for PgChunkRetrievalProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgChunkRetrievalProvider").finish()
    }
}

impl PgChunkRetrievalProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bounded pool over `url` that opens connections on first use
    pub fn connect_lazy(url: &str, max_connections: u32) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy(url)
            .map_err(|e| DomainError::storage(format!("Invalid database url: {}", e)))?;
        Ok(Self::new(pool))
    }
}

/// pgvector text literal, e.g. `[0.1,0.2]`
pub fn embedding_literal(embedding: &[f32]) -> String {
    let values: Vec<String> = embedding.iter().map(|v| v.to_string()).collect();
    format!("[{}]", values.join(","))
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn storage_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::storage(format!("{}: {}", context, e))
}

fn offset(row: &PgRow, column: &str) -> Result<Option<usize>, sqlx::Error> {
    let value: Option<i32> = row.try_get(column)?;
    Ok(value.and_then(|v| usize::try_from(v).ok()))
}

fn chunk_from_row(row: &PgRow) -> Result<RetrievedChunk, sqlx::Error> {
    let page_start: Option<i32> = row.try_get("page_start")?;
    let page_end: Option<i32> = row.try_get("page_end")?;

    Ok(RetrievedChunk {
        chunk_id: row.try_get::<Uuid, _>("chunk_id")?,
        source_id: row.try_get::<Uuid, _>("source_id")?,
        source_title: row.try_get("source_title")?,
        page_start: page_start.map(i64::from),
        page_end: page_end.map(i64::from),
        char_start: offset(row, "char_start")?,
        char_end: offset(row, "char_end")?,
        text: row.try_get("text")?,
        score: 0.0,
    })
}

#[async_trait]
impl ChunkRetrievalProvider for PgChunkRetrievalProvider {
    async fn vector_search(&self, query: &RetrievalQuery) -> Result<Vec<VectorMatch>, DomainError> {
        let rows = sqlx::query(VECTOR_QUERY)
            .bind(embedding_literal(&query.embedding))
            .bind(&query.source_ids)
            .bind(limit_param(query.limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Vector search failed", e))?;

        rows.iter()
            .map(|row| {
                Ok(VectorMatch {
                    chunk: chunk_from_row(row)?,
                    distance: row.try_get("distance")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| storage_error("Failed to decode vector row", e))
    }

    async fn lexical_search(
        &self,
        query: &RetrievalQuery,
    ) -> Result<Vec<LexicalMatch>, DomainError> {
        let rows = sqlx::query(LEXICAL_QUERY)
            .bind(&query.question)
            .bind(&query.source_ids)
            .bind(limit_param(query.limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Lexical search failed", e))?;

        rows.iter()
            .map(|row| {
                Ok(LexicalMatch {
                    chunk: chunk_from_row(row)?,
                    rank: row.try_get("rank")?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| storage_error("Failed to decode lexical row", e))
    }

    fn provider_name(&self) -> &'static str {
        "pgvector"
    }
}
