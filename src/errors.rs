/*!
 * Error types for the twbtrans application.
 *
 * This module contains custom error types for the different layers of the
 * translation engine, using the thiserror crate for ergonomic error definitions.
 * `AppError::kind` maps every failure onto the small set of kinds the command
 * line reports to the user.
 */

use std::path::PathBuf;
use thiserror::Error;

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

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

impl ProviderError {
    /// Whether the failure is a transient transport problem worth retrying.
    ///
    /// Server-side (5xx) API errors, dropped connections and rate limiting
    /// count as transient.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(_) | Self::ConnectionError(_) | Self::RateLimitExceeded(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500 || *status_code == 429,
            Self::ParseError(_) | Self::AuthenticationError(_) => false,
        }
    }
}

/// Errors raised while loading a workbook
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The input file does not exist
    #[error("Input file not found: {0}")]
    InputNotFound(PathBuf),

    /// The input bytes are not well-formed XML
    #[error("Malformed input XML at byte {position}: {message}")]
    MalformedInput {
        /// Byte offset where the parser gave up
        position: usize,
        /// Parser message
        message: String,
    },

    /// The input bytes are not UTF-8
    #[error("Input is not valid UTF-8: {0}")]
    Encoding(String),
}

/// Errors that can occur while talking to the translation gateway
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Transport failure that survived every retry attempt
    #[error("Translation gateway failed on batch {batch} after {attempts} attempt(s): {source}")]
    Transport {
        /// Zero-based batch index
        batch: usize,
        /// Number of attempts made
        attempts: u32,
        /// Last provider error
        #[source]
        source: ProviderError,
    },

    /// The gateway answered with a different number of strings than requested
    #[error("Translation gateway returned {actual} translation(s) for batch {batch}, expected {expected}; refusing to guess the alignment")]
    LengthMismatch {
        /// Zero-based batch index
        batch: usize,
        /// Number of texts submitted
        expected: usize,
        /// Number of texts returned
        actual: usize,
    },

    /// A location no longer holds the text it was planned for
    #[error("Location {path:?} does not hold the text \"{expected}\"")]
    StaleLocation {
        /// Element path of the location
        path: Vec<usize>,
        /// Canonical text the location was planned with
        expected: String,
    },
}

/// Errors detected by the output validator
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The rewritten document no longer parses
    #[error("Translated output is not well-formed XML: {0}")]
    MalformedOutput(String),

    /// A structural marker changed between input and output
    #[error("Structural divergence in {marker}: {before} before translation, {after} after")]
    StructuralDivergence {
        /// Name of the marker that changed
        marker: String,
        /// Value measured on the input
        before: usize,
        /// Value measured on the output
        after: usize,
    },
}

/// The failure kinds reported by the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InputNotFound,
    MalformedInputXml,
    GatewayTransportFailure,
    GatewayLengthMismatch,
    MalformedOutputXml,
    StructuralDivergence,
    Other,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from loading the document
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from output validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AppError {
    /// Classify the error into one of the reported kinds
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Document(DocumentError::InputNotFound(_)) => ErrorKind::InputNotFound,
            Self::Document(_) => ErrorKind::MalformedInputXml,
            Self::Translation(TranslationError::Transport { .. }) => ErrorKind::GatewayTransportFailure,
            Self::Translation(TranslationError::LengthMismatch { .. }) => {
                ErrorKind::GatewayLengthMismatch
            }
            Self::Translation(TranslationError::StaleLocation { .. }) => ErrorKind::Other,
            Self::Validation(ValidationError::MalformedOutput(_)) => ErrorKind::MalformedOutputXml,
            Self::Validation(ValidationError::StructuralDivergence { .. }) => {
                ErrorKind::StructuralDivergence
            }
            Self::File(_) | Self::Config(_) | Self::Unknown(_) => ErrorKind::Other,
        }
    }
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
