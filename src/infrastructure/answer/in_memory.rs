//! In-memory answer repository implementation

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::answer::{AnswerRepository, StoredAnswer};
use crate::domain::error::DomainError;

/// In-memory implementation of AnswerRepository
#[derive(Debug)]
pub struct InMemoryAnswerRepository {
    answers: Arc<RwLock<HashMap<Uuid, StoredAnswer>>>,
}

impl InMemoryAnswerRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            answers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.answers.read().await.len()
    }
}

impl Default for InMemoryAnswerRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerRepository for InMemoryAnswerRepository {
    async fn save(&self, answer: StoredAnswer) -> Result<StoredAnswer, DomainError> {
        let mut answers = self.answers.write().await;
        answers.insert(answer.id, answer.clone());
        Ok(answer)
    }

    async fn get(&self, id: Uuid) -> Result<Option<StoredAnswer>, DomainError> {
        let answers = self.answers.read().await;
        Ok(answers.get(&id).cloned())
    }
}
