use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted answer row; `raw_citations` is an opaque JSON payload that is
/// decoded defensively on read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnswer {
    pub id: Uuid,
    pub query_id: Uuid,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub raw_citations: serde_json::Value,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl StoredAnswer {
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        raw_citations: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            query_id: Uuid::new_v4(),
            question: question.into(),
            answer: answer.into(),
            raw_citations,
            created_at: Utc::now(),
        }
    }
}
