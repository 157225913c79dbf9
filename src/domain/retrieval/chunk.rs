//! Retrieved chunk value objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A chunk returned by retrieval, carrying its current relevance score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub chunk_id: Uuid,
    pub source_id: Uuid,
    #[serde(default)]
    pub source_title: Option<String>,
    #[serde(default)]
    pub page_start: Option<i64>,
    #[serde(default)]
    pub page_end: Option<i64>,
    #[serde(default)]
    pub char_start: Option<usize>,
    #[serde(default)]
    pub char_end: Option<usize>,
    pub text: String,
    #[serde(default)]
    pub score: f64,
}

impl RetrievedChunk {
    pub fn new(chunk_id: Uuid, source_id: Uuid, text: impl Into<String>) -> Self {
        Self {
            chunk_id,
            source_id,
            source_title: None,
            page_start: None,
            page_end: None,
            char_start: None,
            char_end: None,
            text: text.into(),
            score: 0.0,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.source_title = Some(title.into());
        self
    }

    pub fn with_pages(mut self, start: i64, end: i64) -> Self {
        self.page_start = Some(start);
        self.page_end = Some(end);
        self
    }

    pub fn with_char_range(mut self, start: usize, end: usize) -> Self {
        self.char_start = Some(start);
        self.char_end = Some(end);
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// "ps-pe" when a (non-zero) start page is known, otherwise "unknown"
    pub fn page_label(&self) -> String {
        match self.page_start {
            Some(start) if start != 0 => match self.page_end {
                Some(end) => format!("{}-{}", start, end),
                None => format!("{}-None", start),
            },
            _ => "unknown".to_string(),
        }
    }
}

/// Vector-similarity row: smaller distance is better
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorMatch {
    pub chunk: RetrievedChunk,
    pub distance: f64,
}

/// Full-text row carrying the store's rank value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalMatch {
    pub chunk: RetrievedChunk,
    pub rank: f64,
}
