/*!
 * # subtrans - subtitle translation through machine translation APIs
 *
 * A Rust library that translates ordered lists of text segments (typically
 * subtitle lines) through external machine-translation services while
 * respecting each service's request-size, rate and concurrency limits.
 *
 * ## Features
 *
 * - Providers: Google Translate, Volcengine, Aliyun and Tencent
 * - Oversized segments are split, translated piecewise and rejoined
 * - Small segments are merged into one request for single-text APIs
 * - Per-provider rate limiting and bounded concurrent dispatch
 * - Retries with linear backoff for transient failures
 * - SRT, WebVTT and ASS subtitle parsing and output
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: Subtitle file handling and processing
 * - `translation`: The translation core:
 *   - `translation::core`: TranslationService, the entry point
 *   - `translation::batch`: Unit planning and the concurrent dispatcher
 *   - `translation::merge`: Merging small segments into one request
 *   - `translation::splitter`: Chunking oversized segments
 *   - `translation::retry`: Retries with linear backoff
 *   - `translation::rate_limit`: Request pacing per provider
 * - `app_controller`: Main application controller
 * - `language_utils`: Language code utilities
 * - `providers`: Clients for the machine translation APIs
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod subtitle_processor;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, ProviderKind};
pub use errors::{AppError, ErrorKind, ProviderError, SubtitleError, TranslationError};
pub use providers::{Credentials, Provider};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry, SubtitleFormat};
pub use translation::{ProviderProfile, RateLimiter, TranslationService};

use std::time::Duration;

/// Default timeout for a single provider request
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Translate `segments` with `provider` using its built-in limits
///
/// Requests share the process-wide rate limiter of the provider, so
/// concurrent callers together stay under its request rate.
///
/// # Arguments
/// * `segments` - Texts to translate, in order
/// * `target` - Target language code
/// * `source` - Source language code; empty or "auto" detects it
/// * `provider` - Service to use
/// * `credentials` - Credentials for this call only
///
/// # Returns
/// * `Result<Vec<String>, TranslationError>` - One translation per segment, in input order
pub async fn translate_batch(
    segments: &[String],
    target: &str,
    source: &str,
    provider: ProviderKind,
    credentials: &Credentials,
) -> Result<Vec<String>, TranslationError> {
    credentials.require(provider)?;

    let profile = ProviderProfile::for_provider(provider);
    TranslationService::with_provider(
        providers::create_provider(provider, DEFAULT_REQUEST_TIMEOUT),
        profile,
    )
    .with_rate_limiter(RateLimiter::shared(provider, profile.requests_per_second))
    .translate(segments, target, source, credentials)
    .await
}
