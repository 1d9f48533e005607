/*!
 * Error types for the subtrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * The translation core distinguishes four failure classes coming out of a
 * provider adapter (configuration, transient, fatal, count mismatch) and wraps
 * them with orchestration context (retries, cancellation, failing unit).
 */

use thiserror::Error;

/// Errors returned by a provider adapter for a single outbound request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Required credentials are missing or were rejected
    #[error("Provider configuration error: {0}")]
    Config(String),

    /// Network failure, timeout or server-side (5xx / throttling) error
    #[error("Transient provider error: {0}")]
    Transient(String),

    /// Well-formed business rejection reported by the provider
    #[error("Provider rejected the request: {0}")]
    Fatal(String),

    /// The provider returned a different number of results than requested
    #[error("Result count mismatch: requested {expected}, received {actual}")]
    Mismatch {
        /// Number of texts sent
        expected: usize,
        /// Number of texts received
        actual: usize,
    },
}

impl ProviderError {
    /// Whether the retry controller should attempt the call again
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Classify a non-success HTTP reply
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {}: {}", status, body.trim());
        match status {
            401 | 403 => Self::Config(message),
            429 | 500..=599 => Self::Transient(message),
            _ => Self::Fatal(message),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Transient(format!("request timed out: {}", error))
        } else if error.is_connect() {
            Self::Transient(format!("connection failed: {}", error))
        } else if error.is_decode() || error.is_body() {
            Self::Transient(format!("failed to read response: {}", error))
        } else if let Some(status) = error.status() {
            Self::from_status(status.as_u16(), &error.to_string())
        } else {
            Self::Transient(error.to_string())
        }
    }
}

/// Coarse error classes exposed to callers of the translation core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Transient,
    Fatal,
    Mismatch,
    Cancelled,
    Internal,
}

/// Errors that can occur during translation orchestration
#[derive(Error, Debug)]
pub enum TranslationError {
    /// A provider failure that was not retried
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Transient failures persisted through every attempt
    #[error("Translation failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last observed error
        source: ProviderError,
    },

    /// The caller cancelled the operation before the work could start
    #[error("Translation cancelled")]
    Cancelled,

    /// A unit of work failed; the first failure by submission order is reported
    #[error("Unit {unit} (starting at segment {first_segment}) failed: {source}")]
    UnitFailed {
        /// Submission position of the failing unit
        unit: usize,
        /// Input index of the first segment owned by the unit
        first_segment: usize,
        /// Underlying failure
        source: Box<TranslationError>,
    },

    /// A result slot was never written
    #[error("No translation produced for segment {index}")]
    Incomplete {
        /// Input index of the missing segment
        index: usize,
    },

    /// A provider profile carries unusable limits
    #[error("Invalid provider profile: {0}")]
    InvalidProfile(String),
}

impl TranslationError {
    /// Map the error, through any wrapping, to its failure class
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Provider(error) | Self::RetriesExhausted { source: error, .. } => match error {
                ProviderError::Config(_) => ErrorKind::Config,
                ProviderError::Transient(_) => ErrorKind::Transient,
                ProviderError::Fatal(_) => ErrorKind::Fatal,
                ProviderError::Mismatch { .. } => ErrorKind::Mismatch,
            },
            Self::Cancelled => ErrorKind::Cancelled,
            Self::UnitFailed { source, .. } => source.kind(),
            Self::Incomplete { .. } | Self::InvalidProfile(_) => ErrorKind::Internal,
        }
    }
}

/// Errors that can occur during subtitle processing
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The content could not be parsed as the expected format
    #[error("Failed to parse {format} subtitle: {message}")]
    Parse {
        /// Format name
        format: String,
        /// What went wrong
        message: String,
    },

    /// The file extension is not a supported subtitle format
    #[error("Unsupported subtitle format: {0}")]
    UnsupportedFormat(String),

    /// Translations do not line up with the parsed entries
    #[error("Got {actual} translations for {expected} subtitle entries")]
    TranslationCount {
        /// Number of entries
        expected: usize,
        /// Number of translations
        actual: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from subtitle processing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
