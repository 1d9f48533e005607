/*!
 * Core translation service implementation.
 *
 * This module contains the main TranslationService struct and its implementation,
 * which ties one provider adapter to its profile, its rate limiter and the
 * retry policy, and translates ordered lists of segments through them.
 */

use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::app_config::{Config, ProviderKind};
use crate::errors::TranslationError;
use crate::language_utils::normalize_source_language;
use crate::providers::{Credentials, Provider, create_provider};

use super::batch::{BatchDispatcher, ProgressCallback, plan_units};
use super::profile::ProviderProfile;
use super::rate_limit::RateLimiter;
use super::retry::{Gateway, RetryPolicy};

/// Translation service for ordered segment lists
#[derive(Clone)]
pub struct TranslationService {
    /// Adapter for the external API
    provider: Arc<dyn Provider>,

    /// Size, rate and concurrency limits
    profile: ProviderProfile,

    /// Request rate limiter
    limiter: Arc<RateLimiter>,

    /// Retry policy for transient failures
    retry_policy: RetryPolicy,

    /// Optional per-unit progress callback
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for TranslationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationService")
            .field("provider", &self.provider.kind())
            .field("profile", &self.profile)
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}

impl TranslationService {
    /// Create a service for `kind` using the settings in `config`
    ///
    /// The HTTP adapter is built from the provider's settings and the
    /// process-wide rate limiter for the provider is used.
    pub fn new(kind: ProviderKind, config: &Config) -> Result<Self, TranslationError> {
        let provider_config = config.provider_config(kind);
        let profile = provider_config.profile();
        profile.validate()?;

        let provider = create_provider(kind, Duration::from_secs(provider_config.timeout_secs.max(1)));
        Ok(Self {
            limiter: RateLimiter::shared(kind, profile.requests_per_second),
            provider,
            profile,
            retry_policy: RetryPolicy::default(),
            progress: None,
        })
    }

    /// Create a service around an existing adapter
    ///
    /// The service gets its own rate limiter, isolated from other callers.
    pub fn with_provider(provider: Arc<dyn Provider>, profile: ProviderProfile) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::per_second(profile.requests_per_second)),
            provider,
            profile,
            retry_policy: RetryPolicy::default(),
            progress: None,
        }
    }

    /// Use a specific rate limiter
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Use a specific retry policy
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Report `(completed_units, total_units)` after every unit
    pub fn with_progress(mut self, progress: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    /// Provider this service talks to
    pub fn provider_kind(&self) -> ProviderKind {
        self.provider.kind()
    }

    /// Limits in use
    pub fn profile(&self) -> &ProviderProfile {
        &self.profile
    }

    /// Translate `segments` into `target`
    ///
    /// # Arguments
    /// * `segments` - Texts to translate, in order
    /// * `target` - Target language code
    /// * `source` - Source language code; empty means auto-detect
    /// * `credentials` - Request-scoped credentials
    ///
    /// # Returns
    /// * `Result<Vec<String>, TranslationError>` - One translation per segment, in input order
    pub async fn translate(
        &self,
        segments: &[String],
        target: &str,
        source: &str,
        credentials: &Credentials,
    ) -> Result<Vec<String>, TranslationError> {
        self.translate_with_cancel(segments, target, source, credentials, &CancellationToken::new())
            .await
    }

    /// Translate `segments`, giving up on work that has not started once `cancel` fires
    ///
    /// Requests already sent to the provider are allowed to finish.
    pub async fn translate_with_cancel(
        &self,
        segments: &[String],
        target: &str,
        source: &str,
        credentials: &Credentials,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, TranslationError> {
        if segments.is_empty() {
            return Ok(Vec::new());
        }
        self.profile.validate()?;

        let source = normalize_source_language(source);
        let units = plan_units(segments, &self.profile, self.provider.max_texts_per_request());

        info!(
            "Translating {} segments ({} -> {}) with {} in {} units",
            segments.len(),
            source,
            target,
            self.provider.kind().display_name(),
            units.len()
        );

        let gateway = Gateway {
            provider: self.provider.as_ref(),
            limiter: self.limiter.as_ref(),
            policy: self.retry_policy,
            credentials,
            target,
            source: &source,
            cancel,
        };

        BatchDispatcher::new(gateway, self.profile)
            .with_progress(self.progress.as_ref())
            .dispatch(units, segments.len())
            .await
    }
}
