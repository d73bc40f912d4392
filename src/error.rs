//! Error types for the folio crate.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum FolioError {
    /// A requested entity (shard, document, offset) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid argument supplied by the caller.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Index state error (malformed persisted artifact, counter drift).
    #[error("Index error: {0}")]
    Index(String),

    /// The external preprocessor failed or rejected the document.
    ///
    /// Surfaced to callers as a client error; no engine state is
    /// mutated when this is returned from an ingest.
    #[error("Preprocess error: {0}")]
    Preprocess(String),

    /// Internal error (persist-step I/O, invariant violation).
    #[error("Internal error: {0}")]
    Internal(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV record error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl FolioError {
    /// Create a not-found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        FolioError::NotFound(msg.into())
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        FolioError::InvalidArgument(msg.into())
    }

    /// Create an index error.
    pub fn index(msg: impl Into<String>) -> Self {
        FolioError::Index(msg.into())
    }

    /// Create a preprocess error.
    pub fn preprocess(msg: impl Into<String>) -> Self {
        FolioError::Preprocess(msg.into())
    }

    /// Create an internal error.
    pub fn internal(msg: impl Into<String>) -> Self {
        FolioError::Internal(msg.into())
    }
}

/// Result type alias for the folio crate.
pub type Result<T> = std::result::Result<T, FolioError>;
