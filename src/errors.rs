/*!
 * Error types for the slidelingo application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::document::UnitAddress;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting or quota
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Coarse classification of a failed translation call.
///
/// The batch engine picks its retry policy from this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Timeout,
    QuotaExceeded,
    Transient,
    Permanent,
}

/// Errors returned by a single translation call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// The call did not finish within the adapter's timeout
    #[error("Translation timed out after {0:?}")]
    Timeout(Duration),

    /// The service reported a quota or rate-limit condition
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// A failure that may succeed if retried
    #[error("Transient error: {0}")]
    Transient(String),

    /// A failure that will not succeed on retry
    #[error("Permanent error: {0}")]
    Permanent(String),
}

impl TranslationError {
    /// Classification used by the retry policy
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout(_) => FailureKind::Timeout,
            Self::QuotaExceeded(_) => FailureKind::QuotaExceeded,
            Self::Transient(_) => FailureKind::Transient,
            Self::Permanent(_) => FailureKind::Permanent,
        }
    }
}

/// Whether an error message carries a quota signal
pub(crate) fn mentions_quota(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("quota") || lower.contains("resource_exhausted") || lower.contains("rate limit")
}

impl From<ProviderError> for TranslationError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::RateLimitExceeded(message) => Self::QuotaExceeded(message),
            ProviderError::ApiError { status_code, message } => {
                if status_code == 429 || mentions_quota(&message) {
                    Self::QuotaExceeded(message)
                } else if status_code >= 500 || status_code == 408 {
                    Self::Transient(format!("{} - {}", status_code, message))
                } else {
                    Self::Permanent(format!("{} - {}", status_code, message))
                }
            }
            ProviderError::ConnectionError(message) | ProviderError::RequestFailed(message) => {
                if mentions_quota(&message) {
                    Self::QuotaExceeded(message)
                } else {
                    Self::Transient(message)
                }
            }
            ProviderError::ParseError(message) => Self::Permanent(message),
            ProviderError::AuthenticationError(message) => Self::Permanent(message),
        }
    }
}

/// Errors raised while reading or writing a document package
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The package could not be read or parsed
    #[error("Cannot read document {path:?}: {reason}")]
    Unreadable {
        /// Package path
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// The package parsed but its tree is inconsistent
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// A unit address no longer resolves to a node
    #[error("No node at {0}")]
    AddressNotFound(UnitAddress),

    /// The package could not be written
    #[error("Cannot write document {path:?}: {reason}")]
    WriteFailed {
        /// Output path
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },
}
