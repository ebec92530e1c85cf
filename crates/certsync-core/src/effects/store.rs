//! Shared record store effects
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `certsync-effects` (in-memory), or an adapter over the
//!   cluster API in the wiring layer
//! - **Usage**: bootstrap and secondary merge protocols
//!
//! Transport and authentication are the handler's concern. The protocol
//! relies on two store guarantees only: `create` is atomic and fails with
//! [`StoreError::AlreadyExists`] when the id is taken, and `update` is
//! rejected with [`StoreError::Conflict`] when the version token is stale.

use crate::record::{RecordId, SharedRecord};
use async_trait::async_trait;

/// Error type for shared store operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record with this id
    #[error("Record {record} not found")]
    NotFound {
        /// Requested record
        record: RecordId,
    },

    /// A record with this id already exists
    #[error("Record {record} already exists")]
    AlreadyExists {
        /// Record that could not be created
        record: RecordId,
    },

    /// Version token was stale
    #[error("Record {record} was modified concurrently: {reason}")]
    Conflict {
        /// Record under contention
        record: RecordId,
        /// Why the update was rejected
        reason: String,
    },

    /// Transport, authentication or any other backend failure
    #[error("Store backend error: {reason}")]
    Backend {
        /// Backend-specific description
        reason: String,
    },
}

impl StoreError {
    /// Create a backend error
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }

    /// Whether this is a missing-record error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this is a create collision
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Whether this is a stale-version rejection
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Versioned key/value record store shared by all cluster participants
#[async_trait]
pub trait RecordStoreEffects: Send + Sync {
    /// Fetch the current record
    async fn get(&self, id: &RecordId) -> Result<SharedRecord, StoreError>;

    /// Atomically create a record; fails if the id already exists.
    ///
    /// Returns the stored record with its assigned version.
    async fn create(&self, record: SharedRecord) -> Result<SharedRecord, StoreError>;

    /// Replace a record's data if its version still matches.
    ///
    /// Returns the stored record with its new version.
    async fn update(&self, record: SharedRecord) -> Result<SharedRecord, StoreError>;
}
