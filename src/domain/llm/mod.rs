//! LLM provider domain models and traits

mod message;
mod provider;
mod request;
mod response;

pub use message::{ChatMessage, ChatRole};
pub use provider::LlmProvider;
pub use request::{LlmRequest, LlmRequestBuilder, LlmResponseFormat};
pub use response::{ChatCompletion, TokenUsage};

#[cfg(test)]
pub use provider::mock::MockLlmProvider;
