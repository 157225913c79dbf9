use async_trait::async_trait;
use std::fmt::Debug;

use super::{ChatCompletion, LlmRequest};
use crate::domain::DomainError;

/// Trait for chat-completion providers (OpenAI, fakes, etc.)
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Send a chat completion request
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<ChatCompletion, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}
