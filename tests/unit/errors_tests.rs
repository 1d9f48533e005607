/*!
 * Tests for error classification
 */

use subtrans::errors::{AppError, ErrorKind, ProviderError, SubtitleError, TranslationError};

#[test]
fn test_only_transient_errors_should_be_retryable() {
    assert!(ProviderError::Transient("timeout".into()).is_retryable());
    assert!(!ProviderError::Fatal("bad language".into()).is_retryable());
    assert!(!ProviderError::Config("no key".into()).is_retryable());
    assert!(!ProviderError::Mismatch { expected: 2, actual: 1 }.is_retryable());
}

#[test]
fn test_kind_should_map_each_provider_error() {
    let cases = [
        (ProviderError::Config("x".into()), ErrorKind::Config),
        (ProviderError::Transient("x".into()), ErrorKind::Transient),
        (ProviderError::Fatal("x".into()), ErrorKind::Fatal),
        (ProviderError::Mismatch { expected: 1, actual: 0 }, ErrorKind::Mismatch),
    ];
    for (error, kind) in cases {
        assert_eq!(TranslationError::Provider(error).kind(), kind);
    }
    assert_eq!(TranslationError::Cancelled.kind(), ErrorKind::Cancelled);
    assert_eq!(TranslationError::Incomplete { index: 3 }.kind(), ErrorKind::Internal);
}

#[test]
fn test_retries_exhausted_message_should_include_attempts() {
    let error = TranslationError::RetriesExhausted {
        attempts: 3,
        source: ProviderError::Transient("HTTP 503".into()),
    };
    let message = error.to_string();
    assert!(message.contains("3 attempts"));
    assert!(message.contains("HTTP 503"));
    assert_eq!(error.kind(), ErrorKind::Transient);
}

#[test]
fn test_app_error_should_wrap_lower_layers() {
    let error: AppError = SubtitleError::UnsupportedFormat("movie.mkv".into()).into();
    assert!(matches!(error, AppError::Subtitle(_)));

    let error: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(error, AppError::File(_)));

    let error: AppError = TranslationError::Cancelled.into();
    assert!(error.to_string().contains("cancelled"));
}
