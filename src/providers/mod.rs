/*!
 * Provider adapters for the supported machine translation services.
 *
 * Each adapter hides one external API behind the same capability: translate
 * an ordered list of texts and return the translations in the same order,
 * or fail with a typed `ProviderError`.
 * - Google: Cloud Translation v2 REST API
 * - Volcengine: TranslateText with HMAC-SHA256 request signing
 * - Aliyun: TranslateGeneral RPC API (one text per request)
 * - Tencent: TextTranslate with TC3 signing (one text per request)
 * - Mock: scripted provider used by tests and benchmarks
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::ProviderKind;
use crate::errors::ProviderError;

/// Credentials and endpoint settings for one request
///
/// Passed explicitly on every call so that concurrent requests with
/// different credentials never share mutable state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// API key, access key id or secret id
    pub api_key: String,
    /// Access key secret or secret key
    pub api_secret: String,
    /// Optional endpoint override
    pub endpoint: String,
    /// Optional region override
    pub region: String,
}

impl Credentials {
    /// Credentials with a key only
    pub fn with_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Credentials with a key and a secret
    pub fn with_key_and_secret(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ..Default::default()
        }
    }

    /// Fail with a configuration error if the provider's credentials are absent
    pub fn require(&self, provider: ProviderKind) -> Result<(), ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::Config(format!(
                "{} API key is not configured",
                provider.display_name()
            )));
        }
        if provider.requires_secret() && self.api_secret.trim().is_empty() {
            return Err(ProviderError::Config(format!(
                "{} API secret is not configured",
                provider.display_name()
            )));
        }
        Ok(())
    }

    /// Endpoint override, or the given default
    pub fn endpoint_or<'a>(&'a self, default: &'a str) -> &'a str {
        if self.endpoint.trim().is_empty() {
            default
        } else {
            self.endpoint.trim()
        }
    }

    /// Region override, or the given default
    pub fn region_or<'a>(&'a self, default: &'a str) -> &'a str {
        if self.region.trim().is_empty() {
            default
        } else {
            self.region.trim()
        }
    }
}

/// Common trait for all translation providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the translation core. An
/// implementation performs exactly one outbound request per call and never
/// retries on its own.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Which service this adapter talks to
    fn kind(&self) -> ProviderKind;

    /// Largest number of texts one request may carry
    fn max_texts_per_request(&self) -> usize {
        usize::MAX
    }

    /// Translate `texts` into `target`
    ///
    /// # Arguments
    /// * `texts` - Texts to translate, in order
    /// * `target` - Target language code
    /// * `source` - Source language code, or "auto"
    /// * `credentials` - Request-scoped credentials
    ///
    /// # Returns
    /// * `Result<Vec<String>, ProviderError>` - One translation per input text
    async fn translate(
        &self,
        texts: &[String],
        target: &str,
        source: &str,
        credentials: &Credentials,
    ) -> Result<Vec<String>, ProviderError>;
}

/// Check that a provider returned one result per requested text
pub fn ensure_count(expected: usize, results: Vec<String>) -> Result<Vec<String>, ProviderError> {
    if results.len() != expected {
        return Err(ProviderError::Mismatch {
            expected,
            actual: results.len(),
        });
    }
    Ok(results)
}

/// Shared HTTP client with the given request timeout
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_default()
}

/// Build the HTTP adapter for a provider
pub fn create_provider(kind: ProviderKind, timeout: Duration) -> Arc<dyn Provider> {
    match kind {
        ProviderKind::Google => Arc::new(google::Google::new(timeout)),
        ProviderKind::Volcengine => Arc::new(volcengine::Volcengine::new(timeout)),
        ProviderKind::Aliyun => Arc::new(aliyun::Aliyun::new(timeout)),
        ProviderKind::Tencent => Arc::new(tencent::Tencent::new(timeout)),
    }
}

pub mod aliyun;
pub mod google;
pub mod mock;
pub mod signing;
pub mod tencent;
pub mod volcengine;
