//! Bounded retry with randomised exponential backoff around an embedder

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::warn;

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_embedding_request;

/// Retry policy for embedding calls
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, min_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            min_backoff,
            max_backoff: max_backoff.max(min_backoff),
        }
    }

    /// Random delay before retry number `attempt` (1-based), drawn from
    /// `[min, min(max, min * 2^(attempt-1))]`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let min = self.min_backoff.as_millis() as u64;
        let max = self.max_backoff.as_millis() as u64;
        let exponent = attempt.saturating_sub(1).min(32);
        let ceiling = min.saturating_mul(1u64 << exponent).min(max).max(min);

        let millis = if ceiling > min {
            rand::thread_rng().gen_range(min..=ceiling)
        } else {
            min
        };
        Duration::from_millis(millis)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(20))
    }
}

/// Embedding provider that retries failed calls of the wrapped provider
#[derive(Debug)]
pub struct RetryingEmbeddingProvider {
    inner: Arc<dyn EmbeddingProvider>,
    policy: RetryPolicy,
}

impl RetryingEmbeddingProvider {
    pub fn new(inner: Arc<dyn EmbeddingProvider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl EmbeddingProvider for RetryingEmbeddingProvider {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let provider = self.inner.provider_name();
        let mut attempt = 1;

        loop {
            match self.inner.embed(request.clone()).await {
                Ok(response) => {
                    record_embedding_request(provider, true);
                    return Ok(response);
                }
                Err(e) => {
                    record_embedding_request(provider, false);
                    if attempt >= self.policy.max_attempts {
                        return Err(e);
                    }

                    let delay = self.policy.backoff(attempt);
                    warn!(
                        provider,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Embedding request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}
