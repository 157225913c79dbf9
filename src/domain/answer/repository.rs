//! Answer persistence trait

use async_trait::async_trait;
use std::fmt::Debug;
use uuid::Uuid;

use super::StoredAnswer;
use crate::domain::DomainError;

/// Store for generated answers
#[async_trait]
pub trait AnswerRepository: Send + Sync + Debug {
    /// Persist an answer, returning the stored row
    async fn save(&self, answer: StoredAnswer) -> Result<StoredAnswer, DomainError>;

    /// Get an answer by ID
    async fn get(&self, id: Uuid) -> Result<Option<StoredAnswer>, DomainError>;
}
