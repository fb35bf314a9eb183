/*!
 * Translation gateway.
 *
 * Wraps a [`Provider`] with the batch contract: one call per batch, the
 * answer must hold exactly one string per submitted text, in order. Transient
 * transport failures are retried with exponential backoff; a count mismatch
 * ends the run immediately.
 */

use std::time::Duration;

use log::{debug, warn};

use crate::errors::{ProviderError, TranslationError};
use crate::providers::{Provider, TranslationRequest};

use super::batch::Batch;

/// Retry settings for gateway calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each further retry
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff_base_ms: 0,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }
}

/// Batch-level access to a provider
#[derive(Debug)]
pub struct TranslationGateway<'a> {
    provider: &'a dyn Provider,
    target_language: String,
    preserve_terms: Vec<String>,
    retry: RetryPolicy,
}

impl<'a> TranslationGateway<'a> {
    /// Create a gateway translating into `target_language`
    pub fn new(provider: &'a dyn Provider, target_language: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            provider,
            target_language: target_language.into(),
            preserve_terms: Vec::new(),
            retry,
        }
    }

    /// Terms the provider is told to leave untouched
    pub fn with_preserve_terms(mut self, terms: Vec<String>) -> Self {
        self.preserve_terms = terms;
        self
    }

    /// Translate one batch, returning one string per unit in unit order
    pub async fn translate_batch(&self, batch: &Batch<'_>) -> Result<Vec<String>, TranslationError> {
        let request = TranslationRequest::new(batch.texts(), self.target_language.clone())
            .with_preserve_terms(self.preserve_terms.clone());

        let translations = self.call_with_retry(batch.index, &request).await?;

        if translations.len() != request.texts.len() {
            return Err(TranslationError::LengthMismatch {
                batch: batch.index,
                expected: request.texts.len(),
                actual: translations.len(),
            });
        }

        Ok(translations)
    }

    async fn call_with_retry(
        &self,
        batch: usize,
        request: &TranslationRequest,
    ) -> Result<Vec<String>, TranslationError> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!(
                "Submitting batch {} ({} text(s)) to {}, attempt {}/{}",
                batch,
                request.texts.len(),
                self.provider.name(),
                attempt,
                self.retry.max_retries + 1
            );

            let error: ProviderError = match self.provider.translate(request).await {
                Ok(translations) => return Ok(translations),
                Err(e) => e,
            };

            if !error.is_retryable() || attempt > self.retry.max_retries {
                return Err(TranslationError::Transport {
                    batch,
                    attempts: attempt,
                    source: error,
                });
            }

            let delay = self.retry.backoff(attempt);
            warn!(
                "Batch {} failed on {} ({}), retrying in {} ms",
                batch,
                self.provider.name(),
                error,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }
}
