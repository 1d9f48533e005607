/*!
 * Common test utilities for the subtrans test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use subtrans::ProviderKind;
use subtrans::providers::mock::MockProvider;
use subtrans::translation::{ProviderProfile, RetryPolicy, TranslationService};

/// Route log output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_SRT)
}

/// Three entry SRT document
pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
";

/// `count` distinct short segments
pub fn segments(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("segment {}", i)).collect()
}

/// Built-in profile of `kind` with some fields replaced
pub fn profile_with(kind: ProviderKind, adjust: impl FnOnce(&mut ProviderProfile)) -> ProviderProfile {
    let mut profile = ProviderProfile::for_provider(kind);
    adjust(&mut profile);
    profile
}

/// Service around `provider` with the default retry policy
pub fn service_for(provider: &MockProvider, profile: ProviderProfile) -> TranslationService {
    TranslationService::with_provider(Arc::new(provider.clone()), profile)
}

/// Retry policy without waits, for tests that do not measure time
pub fn instant_retries() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::ZERO,
    }
}
