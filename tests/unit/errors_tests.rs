/*!
 * Tests for error types and failure classification
 */

use std::time::Duration;

use slidelingo::errors::{DocumentError, FailureKind, ProviderError, TranslationError};
use slidelingo::UnitAddress;

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 503,
        message: "Service unavailable".to_string(),
    };
    assert_eq!(error.to_string(), "API responded with error: 503 - Service unavailable");
}

#[test]
fn test_translationError_timeout_shouldClassifyAsTimeout() {
    let error = TranslationError::Timeout(Duration::from_secs(30));
    assert_eq!(error.kind(), FailureKind::Timeout);
    assert!(error.to_string().contains("30s"));
}

#[test]
fn test_providerError_conversions_shouldClassifyEachKind() {
    let cases = vec![
        (ProviderError::RateLimitExceeded("slow down".into()), FailureKind::QuotaExceeded),
        (
            ProviderError::ApiError { status_code: 429, message: "Too Many Requests".into() },
            FailureKind::QuotaExceeded,
        ),
        (
            ProviderError::ApiError { status_code: 400, message: "Quota exceeded for project".into() },
            FailureKind::QuotaExceeded,
        ),
        (
            ProviderError::ApiError { status_code: 502, message: "Bad gateway".into() },
            FailureKind::Transient,
        ),
        (
            ProviderError::ApiError { status_code: 404, message: "Model not found".into() },
            FailureKind::Permanent,
        ),
        (ProviderError::ConnectionError("connection reset".into()), FailureKind::Transient),
        (ProviderError::RequestFailed("builder error".into()), FailureKind::Transient),
        (ProviderError::ParseError("expected value".into()), FailureKind::Permanent),
        (ProviderError::AuthenticationError("API key not valid".into()), FailureKind::Permanent),
    ];

    for (provider_error, expected) in cases {
        let description = provider_error.to_string();
        let error: TranslationError = provider_error.into();
        assert_eq!(error.kind(), expected, "{}", description);
    }
}

#[test]
fn test_documentError_addressNotFound_shouldNameAddress() {
    let error = DocumentError::AddressNotFound(UnitAddress::TableCell {
        slide: 1,
        shape: 0,
        row: 2,
        column: 3,
    });
    assert_eq!(error.to_string(), "No node at slide 2 shape 1 cell (3, 4)");
}
