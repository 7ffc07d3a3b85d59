//! Storage error types.

use thiserror::Error;

/// Errors reported by a [`Datastore`](crate::Datastore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("{entity} {key} already exists")]
    Conflict {
        /// Kind of record, e.g. `"issuer"`.
        entity: &'static str,
        /// The conflicting key.
        key: String,
    },

    /// The row targeted by an update does not exist.
    #[error("{entity} {key} not found")]
    NotFound {
        entity: &'static str,
        key: String,
    },

    /// The backend itself failed (connection, timeout, driver error).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether the error is a uniqueness violation.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
