//! Error types for the cache bridge
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Store Error ==
/// Failure reported by the backing repository.
///
/// The bridge treats the store as opaque, so this carries only a message.
/// Store implementations build one with [`StoreError::new`] from whatever
/// underlying error they hit (connection loss, backend fault, ...).
#[derive(Error, Debug)]
#[error("{message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    /// Creates a store error from any displayable cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Convenience Result type for repository implementations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Cache Error Enum ==
/// Unified error type for pool operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key contains a reserved character
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// The backing store failed during a read-path operation
    #[error("Store failure: {0}")]
    Store(#[from] StoreError),

    /// A stored payload could not be serialized or deserialized
    #[error("Serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for pool operations.
pub type Result<T> = std::result::Result<T, CacheError>;
