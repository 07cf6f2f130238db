//! Error types for document construction, validation, and serialization.

use thiserror::Error;

use crate::validate::Violation;

/// Result type alias for oasdoc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for oasdoc operations
#[derive(Debug, Error)]
pub enum Error {
    /// Two mutually exclusive fields were both set
    #[error("invalid combination: `{field}` is mutually exclusive with `{other}`")]
    InvalidCombination { field: String, other: String },

    /// The document failed validation; serialization refused to proceed
    #[error("document validation failed with {} violation(s)", violations.len())]
    ValidationFailed { violations: Vec<Violation> },

    /// The target encoding could not represent the document
    #[error("encoding failure: {0}")]
    EncodingFailure(String),

    /// Input bytes or value tree do not form a well-shaped document
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// The `openapi` version field names a specification this crate does not handle
    #[error("unsupported OpenAPI version: {0}")]
    UnsupportedVersion(String),

    /// JSON encoder error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML encoder error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Creates an InvalidCombination error
    pub fn invalid_combination(field: impl Into<String>, other: impl Into<String>) -> Self {
        Error::InvalidCombination {
            field: field.into(),
            other: other.into(),
        }
    }

    /// Creates a ValidationFailed error from collected violations
    pub fn validation_failed(violations: Vec<Violation>) -> Self {
        Error::ValidationFailed { violations }
    }

    /// Creates an EncodingFailure error
    pub fn encoding_failure(msg: impl Into<String>) -> Self {
        Error::EncodingFailure(msg.into())
    }

    /// Creates an InvalidDocument error
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Error::InvalidDocument(msg.into())
    }

    /// Returns the violations carried by a ValidationFailed error, if any
    pub fn violations(&self) -> Option<&[Violation]> {
        match self {
            Error::ValidationFailed { violations } => Some(violations),
            _ => None,
        }
    }
}
