/*!
 * Provider-specific limits.
 *
 * This module provides the size, rate and concurrency settings that drive the
 * generic dispatcher for each provider, based on provider characteristics
 * such as request size caps, published rate limits and API constraints.
 */

use crate::app_config::ProviderKind;
use crate::errors::TranslationError;

/// Provider-specific limits with tuned defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderProfile {
    /// Segments longer than this many characters are split
    pub max_single_request_chars: usize,
    /// Chunk size used when splitting an oversized segment
    pub split_chunk_chars: usize,
    /// Character budget of one merged request (0 disables merging)
    pub merge_budget_chars: usize,
    /// Outbound requests allowed per second
    pub requests_per_second: u32,
    /// Units of work allowed in flight at once
    pub max_concurrent_batches: usize,
    /// Segments per batch request
    pub batch_size: usize,
}

impl ProviderProfile {
    /// Get the built-in profile for a given provider
    pub fn for_provider(provider: ProviderKind) -> Self {
        match provider {
            ProviderKind::Google | ProviderKind::Volcengine => Self {
                max_single_request_chars: 5000,
                split_chunk_chars: 4000,
                merge_budget_chars: 0,
                requests_per_second: 10,
                max_concurrent_batches: 5,
                batch_size: 16,
            },
            // Single-text APIs, so fewer larger requests pay off
            ProviderKind::Aliyun => Self {
                max_single_request_chars: 5000,
                split_chunk_chars: 4000,
                merge_budget_chars: 4500,
                requests_per_second: 50,
                max_concurrent_batches: 5,
                batch_size: 1,
            },
            ProviderKind::Tencent => Self {
                max_single_request_chars: 5000,
                split_chunk_chars: 4000,
                merge_budget_chars: 4500,
                requests_per_second: 5,
                max_concurrent_batches: 5,
                batch_size: 1,
            },
        }
    }

    /// Whether consecutive segments are merged into one request
    pub fn merges(&self) -> bool {
        self.merge_budget_chars > 0
    }

    /// Reject limits the dispatcher cannot work with
    pub fn validate(&self) -> Result<(), TranslationError> {
        let zero_field = [
            ("max_single_request_chars", self.max_single_request_chars),
            ("split_chunk_chars", self.split_chunk_chars),
            ("requests_per_second", self.requests_per_second as usize),
            ("max_concurrent_batches", self.max_concurrent_batches),
            ("batch_size", self.batch_size),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0);

        if let Some((name, _)) = zero_field {
            return Err(TranslationError::InvalidProfile(format!("{} must be greater than zero", name)));
        }
        if self.split_chunk_chars > self.max_single_request_chars {
            return Err(TranslationError::InvalidProfile(format!(
                "split_chunk_chars ({}) exceeds max_single_request_chars ({})",
                self.split_chunk_chars, self.max_single_request_chars
            )));
        }
        Ok(())
    }
}
