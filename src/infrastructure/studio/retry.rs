//! Bounded retries with exponential backoff for collaborator calls.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::errors::GenerationError;
use crate::domain::models::{GenerationMode, IdeaSeed, RetryConfig};
use crate::domain::ports::IdeaGenerator;

/// Retry policy for retryable generation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    max_retries: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
}

impl RetryPolicy {
    /// Policy with explicit limits.
    pub const fn new(max_retries: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    /// Policy from `retry.*` settings.
    pub const fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_retries,
            config.initial_backoff_ms,
            config.max_backoff_ms,
        )
    }

    /// Retries after the first attempt.
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Run `operation` until it succeeds, fails permanently, or the retry
    /// budget is spent. The last error is returned unchanged.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, GenerationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(retries = attempt, "operation succeeded after retries");
                    }
                    return Ok(result);
                }
                Err(err) => {
                    if !self.should_retry(&err, attempt) {
                        if attempt >= self.max_retries && err.is_retryable() {
                            warn!(
                                attempts = attempt + 1,
                                kind = err.kind(),
                                "retry budget exhausted: {err}"
                            );
                        } else {
                            debug!(kind = err.kind(), "permanent error, not retrying: {err}");
                        }
                        return Err(err);
                    }

                    let backoff = self.calculate_backoff(attempt);
                    warn!(
                        attempt = attempt + 1,
                        kind = err.kind(),
                        backoff_ms = backoff.as_millis() as u64,
                        "retryable generation error: {err}"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }

    /// `min(initial_backoff * 2^attempt, max_backoff)`
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let backoff_ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(attempt))
            .min(self.max_backoff_ms);

        Duration::from_millis(backoff_ms)
    }

    /// Whether `error` on zero-based `attempt` should be retried.
    pub const fn should_retry(&self, error: &GenerationError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_retryable()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Idea generator decorator that retries duplicates, low self-reported
/// quality and transient failures.
pub struct RetryingIdeaGenerator {
    inner: Arc<dyn IdeaGenerator>,
    policy: RetryPolicy,
}

impl RetryingIdeaGenerator {
    /// Wrap `inner` with `policy`.
    pub fn new(inner: Arc<dyn IdeaGenerator>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl IdeaGenerator for RetryingIdeaGenerator {
    async fn generate(
        &self,
        avoid: &[String],
        mode: &GenerationMode,
    ) -> Result<IdeaSeed, GenerationError> {
        let inner = &self.inner;
        self.policy
            .execute(move || inner.generate(avoid, mode))
            .await
    }
}
