//! Unified error type for certificate bootstrap and reconciliation
//!
//! Only two store conditions are ever handled inside the protocol: a missing
//! record on the first bootstrap fetch and a create collision. Everything
//! else surfaces here with enough context to find the failing file or record.

use crate::effects::StoreError;
use crate::record::RecordId;
use std::path::PathBuf;

/// Error type for all certsync operations
#[derive(Debug, thiserror::Error)]
pub enum CertError {
    /// Record missing on a path where it must exist
    #[error("Record not found: {record}")]
    NotFound {
        /// Record that was looked up
        record: RecordId,
    },

    /// Record creation collided with an existing record
    #[error("Record already exists: {record}")]
    AlreadyExists {
        /// Record that could not be created
        record: RecordId,
    },

    /// Local filesystem operation failed
    #[error("{operation} {}: {source}", .path.display())]
    Io {
        /// Operation that failed (`read`, `write`, `create directory`, ...)
        operation: String,
        /// Offending path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A mapped key resolved to zero-length content
    #[error("Record is missing content for {key}")]
    EmptyContent {
        /// Storage key with empty content
        key: String,
    },

    /// Optimistic update lost, or the record holds content from another writer
    #[error("Conflict on {record}: {reason}")]
    Conflict {
        /// Record under contention
        record: RecordId,
        /// What the conflict was
        reason: String,
    },

    /// The caller cancelled a wait
    #[error("Cancelled before the operation completed")]
    Cancelled,

    /// Unexpected shared store failure
    #[error("{operation} {record}: {source}")]
    Store {
        /// Record involved
        record: RecordId,
        /// Operation that failed (`get`, `create`, `update`)
        operation: String,
        /// Underlying store error
        #[source]
        source: StoreError,
    },

    /// PKI asset generation failed
    #[error("{stage}: {reason}")]
    Generator {
        /// Generation stage (`create pki assets`, `create kube configs`)
        stage: String,
        /// Error reported by the generator
        reason: String,
    },

    /// Invalid configuration or table
    #[error("Invalid: {message}")]
    Invalid {
        /// Description of the invalid input
        message: String,
    },
}

impl CertError {
    /// Create an I/O error with the failing operation and path
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a retryable conflict error
    pub fn conflict(record: &RecordId, reason: impl Into<String>) -> Self {
        Self::Conflict {
            record: record.clone(),
            reason: reason.into(),
        }
    }

    /// Wrap an unexpected store error
    pub fn store(record: &RecordId, operation: impl Into<String>, source: StoreError) -> Self {
        Self::Store {
            record: record.clone(),
            operation: operation.into(),
            source,
        }
    }

    /// Create a generator error for the given stage
    pub fn generator(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Generator {
            stage: stage.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Whether re-fetching and trying again can succeed.
    ///
    /// Only conflicts are retryable; the caller owns the retry loop.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Standard Result type for certsync operations
pub type Result<T> = std::result::Result<T, CertError>;
