/*!
 * Tests for error classification
 */

use std::path::PathBuf;
use twbtrans::errors::{AppError, DocumentError, ErrorKind, ProviderError, TranslationError, ValidationError};

#[test]
fn test_kind_shouldMapEveryFailureToItsReportedKind() {
    let cases: Vec<(AppError, ErrorKind)> = vec![
        (
            DocumentError::InputNotFound(PathBuf::from("missing.twb")).into(),
            ErrorKind::InputNotFound,
        ),
        (
            DocumentError::MalformedInput {
                position: 12,
                message: "unexpected end".into(),
            }
            .into(),
            ErrorKind::MalformedInputXml,
        ),
        (
            TranslationError::Transport {
                batch: 0,
                attempts: 4,
                source: ProviderError::ConnectionError("reset".into()),
            }
            .into(),
            ErrorKind::GatewayTransportFailure,
        ),
        (
            TranslationError::LengthMismatch {
                batch: 1,
                expected: 3,
                actual: 2,
            }
            .into(),
            ErrorKind::GatewayLengthMismatch,
        ),
        (
            ValidationError::MalformedOutput("bad".into()).into(),
            ErrorKind::MalformedOutputXml,
        ),
        (
            ValidationError::StructuralDivergence {
                marker: "element count".into(),
                before: 10,
                after: 9,
            }
            .into(),
            ErrorKind::StructuralDivergence,
        ),
        (AppError::Config("bad".into()), ErrorKind::Other),
    ];

    for (error, kind) in cases {
        assert_eq!(error.kind(), kind, "{}", error);
    }
}

#[test]
fn test_display_withLengthMismatch_shouldNameBatchAndCounts() {
    let error = TranslationError::LengthMismatch {
        batch: 2,
        expected: 20,
        actual: 19,
    };
    let message = error.to_string();
    assert!(message.contains("20"), "{}", message);
    assert!(message.contains("19"), "{}", message);
}

#[test]
fn test_from_ioError_shouldBecomeFileError() {
    let error: AppError = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
    assert!(matches!(error, AppError::File(_)));
}
