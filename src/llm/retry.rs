//! Bounded retries with exponential backoff, an overall deadline and
//! cooperative cancellation for LLM calls.

use super::{LlmError, LlmRequest, LlmResponse, LlmService};
use async_trait::async_trait;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Retry schedule for one logical LLM call
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Deadline for the whole call, retries and sleeps included
    pub overall_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            overall_timeout: Duration::from_secs(600),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based): 1s, 2s, 4s, ... capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }
}

/// Wraps a service with [`RetryPolicy`] semantics
pub struct RetryingService {
    inner: Arc<dyn LlmService>,
    policy: RetryPolicy,
    cancel: CancellationToken,
}

impl RetryingService {
    pub fn new(inner: Arc<dyn LlmService>, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            cancel: CancellationToken::new(),
        }
    }

    /// Share a cancellation token; cancelling it aborts in-flight and pending attempts.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    async fn run_attempts(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let mut attempt = 1;
        loop {
            match self.inner.complete(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.kind.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = e
                        .retry_after
                        .unwrap_or_else(|| with_jitter(self.policy.delay_for(attempt)))
                        .min(self.policy.max_delay);
                    tracing::warn!(
                        model = %self.inner.model_id(),
                        attempt,
                        delay_ms = %delay.as_millis(),
                        error = %e.message,
                        "Retrying LLM request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl LlmService for RetryingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let deadline = self.policy.overall_timeout;
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(LlmError::cancelled("LLM request cancelled")),
            result = tokio::time::timeout(deadline, self.run_attempts(request)) => {
                result.unwrap_or_else(|_| {
                    Err(LlmError::timeout(format!(
                        "LLM request exceeded {}s deadline",
                        deadline.as_secs()
                    )))
                })
            }
        }
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}

/// Add up to 25% random jitter
fn with_jitter(delay: Duration) -> Duration {
    let max_jitter = u64::try_from(delay.as_millis() / 4).unwrap_or(u64::MAX);
    if max_jitter == 0 {
        return delay;
    }
    let jitter = rand::thread_rng().gen_range(0..=max_jitter);
    delay + Duration::from_millis(jitter)
}
