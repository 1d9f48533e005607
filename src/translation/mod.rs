/*!
 * Translation orchestration for ordered segment lists.
 *
 * This module contains the core that sits between callers and the provider
 * adapters. It is split into several submodules:
 *
 * - `core`: TranslationService, the entry point
 * - `batch`: unit planning and the concurrent dispatcher
 * - `merge`: joining small segments into single requests
 * - `splitter`: chunking oversized segments
 * - `retry`: bounded retries with linear backoff
 * - `rate_limit`: per-provider request pacing
 * - `profile`: per-provider limits
 */

// Re-export main types for easier usage
pub use self::batch::{Batch, BatchDispatcher, ProgressCallback, Segment, WorkUnit, plan_units};
pub use self::core::TranslationService;
pub use self::merge::MergedBatch;
pub use self::profile::ProviderProfile;
pub use self::rate_limit::RateLimiter;
pub use self::retry::{Gateway, RetryPolicy};

// Submodules
pub mod batch;
pub mod core;
pub mod merge;
pub mod profile;
pub mod rate_limit;
pub mod retry;
pub mod splitter;
