//! LLM provider implementations

mod chat_client;
mod openai;
mod transport;

pub use chat_client::{parse_json_object, ChatClient};
pub use openai::OpenAiProvider;
pub use transport::{OpenAiTransport, ReqwestTransport};

pub(crate) use openai::DEFAULT_OPENAI_BASE_URL;

#[cfg(test)]
pub use transport::mock::MockOpenAiTransport;
