use serde::{Deserialize, Serialize};

use super::ChatMessage;

/// Tokens billed for one chat call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

/// Model reply to one pipeline prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub model: String,
    pub message: ChatMessage,
    pub usage: Option<TokenUsage>,
}

impl ChatCompletion {
    pub fn new(id: String, model: String, message: ChatMessage) -> Self {
        Self {
            id,
            model,
            message,
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Raw reply text; JSON-mode replies are parsed by the caller
    pub fn text(&self) -> &str {
        &self.message.content
    }
}
