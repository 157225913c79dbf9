//! Authenticated JSON transport to OpenAI-compatible endpoints

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::DomainError;

const PROVIDER: &str = "openai";

/// POSTs a JSON body with a bearer key and returns the JSON reply
#[async_trait]
pub trait OpenAiTransport: Send + Sync + Debug {
    /// Non-2xx statuses come back as provider errors carrying the response body
    async fn post_json(&self, url: &str, api_key: &str, body: &Value) -> Result<Value, DomainError>;
}

/// reqwest-backed transport with a per-request timeout
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn with_timeout(timeout: Duration) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl OpenAiTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, api_key: &str, body: &Value) -> Result<Value, DomainError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DomainError::provider(PROVIDER, format!("Request to {} timed out", url))
                } else {
                    DomainError::provider(PROVIDER, format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::provider(
                PROVIDER,
                format!("HTTP {}: {}", status, error_body),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| DomainError::provider(PROVIDER, format!("Failed to parse response: {}", e)))
    }
}
