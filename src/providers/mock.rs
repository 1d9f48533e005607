/*!
 * Mock provider implementation for testing.
 *
 * This module provides a scripted provider that simulates different behaviors:
 * - `MockProvider::echo()` - Always succeeds, returning the input unchanged
 * - `MockProvider::prefixed()` - Prefixes every line of every text
 * - `MockProvider::transient_then_ok()` - Fails N times with a transient error
 * - `MockProvider::failing()` - Always fails with the given error
 * - `MockProvider::dropping_merged_line()` - Loses a line of merged requests
 *
 * Every call is recorded (texts, timestamp) along with the highest number of
 * calls observed in flight at once, so tests can assert on batching,
 * pacing and concurrency without a network.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

use crate::app_config::ProviderKind;
use crate::errors::ProviderError;
use crate::providers::{Credentials, Provider};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with `prefix` prepended to every line
    Prefix(String),
    /// Fails with a transient error for the first `failures` calls
    TransientThenOk { failures: usize },
    /// Always fails with the given error
    Failing(ProviderError),
    /// Drops the last line of multi-line texts containing `marker`
    DropMergedLine { marker: String },
    /// Returns one result fewer than requested
    ShortResult,
}

/// One recorded call
#[derive(Debug, Clone)]
pub struct MockCall {
    /// Texts the call carried
    pub texts: Vec<String>,
    /// When the call started
    pub at: Instant,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Mutex<Vec<MockCall>>,
    request_count: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Provider this mock stands in for
    kind: ProviderKind,
    /// Largest number of texts per call
    max_texts: usize,
    /// Simulated response time
    delay: Option<Duration>,
    /// Texts containing this marker fail with the paired error
    fail_on: Option<(String, ProviderError)>,
    /// Shared call log, so clones observe the same history
    state: Arc<MockState>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            kind: ProviderKind::Google,
            max_texts: usize::MAX,
            delay: None,
            fail_on: None,
            state: Arc::new(MockState::default()),
        }
    }

    /// Returns every text unchanged
    pub fn echo() -> Self {
        Self::new(MockBehavior::Prefix(String::new()))
    }

    /// Prefixes every line of every text
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self::new(MockBehavior::Prefix(prefix.into()))
    }

    /// Fails transiently `failures` times, then echoes
    pub fn transient_then_ok(failures: usize) -> Self {
        Self::new(MockBehavior::TransientThenOk { failures })
    }

    /// Always fails with `error`
    pub fn failing(error: ProviderError) -> Self {
        Self::new(MockBehavior::Failing(error))
    }

    /// Loses the last line of merged texts containing `marker`
    pub fn dropping_merged_line(marker: impl Into<String>) -> Self {
        Self::new(MockBehavior::DropMergedLine { marker: marker.into() })
    }

    /// Returns one result fewer than requested
    pub fn short_result() -> Self {
        Self::new(MockBehavior::ShortResult)
    }

    /// Report a different provider kind
    pub fn with_kind(mut self, kind: ProviderKind) -> Self {
        self.kind = kind;
        self
    }

    /// Cap the number of texts per call
    pub fn with_max_texts(mut self, max_texts: usize) -> Self {
        self.max_texts = max_texts.max(1);
        self
    }

    /// Take `delay` to answer every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail any call carrying a text that contains `marker`
    pub fn with_failure_on(mut self, marker: impl Into<String>, error: ProviderError) -> Self {
        self.fail_on = Some((marker.into(), error));
        self
    }

    /// Number of calls received
    pub fn call_count(&self) -> usize {
        self.state.request_count.load(Ordering::SeqCst)
    }

    /// Every call received, in arrival order
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.calls.lock().clone()
    }

    /// Start time of every call, in arrival order
    pub fn call_times(&self) -> Vec<Instant> {
        self.state.calls.lock().iter().map(|c| c.at).collect()
    }

    /// Highest number of calls that were in flight at the same time
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    fn prefix_lines(prefix: &str, text: &str) -> String {
        text.split('\n')
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn respond(&self, count: usize, texts: &[String]) -> Result<Vec<String>, ProviderError> {
        if let Some((marker, error)) = &self.fail_on {
            if texts.iter().any(|t| t.contains(marker.as_str())) {
                return Err(error.clone());
            }
        }

        match &self.behavior {
            MockBehavior::Prefix(prefix) => {
                Ok(texts.iter().map(|t| Self::prefix_lines(prefix, t)).collect())
            }
            MockBehavior::TransientThenOk { failures } => {
                if count < *failures {
                    Err(ProviderError::Transient(format!(
                        "Simulated transient failure (request #{})",
                        count + 1
                    )))
                } else {
                    Ok(texts.to_vec())
                }
            }
            MockBehavior::Failing(error) => Err(error.clone()),
            MockBehavior::DropMergedLine { marker } => Ok(texts
                .iter()
                .map(|t| {
                    if t.contains('\n') && t.contains(marker.as_str()) {
                        let mut lines: Vec<&str> = t.split('\n').collect();
                        lines.pop();
                        lines.join("\n")
                    } else {
                        t.clone()
                    }
                })
                .collect()),
            MockBehavior::ShortResult => {
                let mut results = texts.to_vec();
                results.pop();
                Ok(results)
            }
        }
    }
}

struct InFlightGuard<'a>(&'a MockState);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn max_texts_per_request(&self) -> usize {
        self.max_texts
    }

    async fn translate(
        &self,
        texts: &[String],
        _target: &str,
        _source: &str,
        _credentials: &Credentials,
    ) -> Result<Vec<String>, ProviderError> {
        let count = self.state.request_count.fetch_add(1, Ordering::SeqCst);
        self.state.calls.lock().push(MockCall {
            texts: texts.to_vec(),
            at: Instant::now(),
        });

        let current = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.state);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.respond(count, texts)
    }
}
