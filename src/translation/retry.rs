/*!
 * Bounded retries around a single provider call.
 *
 * `Gateway` is the only path through which the translation core reaches a
 * provider: every attempt first takes a rate-limit token, transient failures
 * are retried with linear backoff, and everything else is returned at once.
 */

use log::{debug, warn};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::errors::TranslationError;
use crate::providers::{Credentials, Provider, ensure_count};

use super::rate_limit::RateLimiter;

/// Retry policy for transient provider failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Backoff unit; attempt `n` is followed by `n * base_delay`
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Everything one request needs, borrowed for the duration of a translation
#[derive(Clone, Copy)]
pub struct Gateway<'a> {
    pub provider: &'a dyn Provider,
    pub limiter: &'a RateLimiter,
    pub policy: RetryPolicy,
    pub credentials: &'a Credentials,
    pub target: &'a str,
    pub source: &'a str,
    pub cancel: &'a CancellationToken,
}

impl Gateway<'_> {
    /// Translate `texts` with rate limiting and retries
    pub async fn translate(&self, texts: &[String]) -> Result<Vec<String>, TranslationError> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            self.limiter.acquire(self.cancel).await?;

            let result = self
                .provider
                .translate(texts, self.target, self.source, self.credentials)
                .await
                .and_then(|translated| ensure_count(texts.len(), translated));

            let error = match result {
                Ok(translated) => {
                    if attempt > 1 {
                        debug!("{} request succeeded on attempt {}", self.provider.kind(), attempt);
                    }
                    return Ok(translated);
                }
                Err(error) if error.is_retryable() => error,
                Err(error) => return Err(TranslationError::Provider(error)),
            };

            if attempt >= max_attempts {
                return Err(TranslationError::RetriesExhausted {
                    attempts: attempt,
                    source: error,
                });
            }

            let delay = self.policy.delay_after(attempt);
            warn!(
                "{} attempt {}/{} failed: {}. Retrying in {:?}",
                self.provider.kind(),
                attempt,
                max_attempts,
                error,
                delay
            );

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(TranslationError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Translate one text
    pub async fn translate_one(&self, text: &str) -> Result<String, TranslationError> {
        let mut translated = self.translate(&[text.to_string()]).await?;
        translated
            .pop()
            .ok_or(TranslationError::Incomplete { index: 0 })
    }
}
