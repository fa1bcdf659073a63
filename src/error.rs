//! Error types for the score-indexed cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Store Error Enum ==
/// Failure of a single round trip to the underlying store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store rejected the command or the transport failed
    #[error("store command failed: {0}")]
    Command(String),

    /// The store connection has been released
    #[error("store connection closed")]
    Closed,

    /// The caller's deadline elapsed before the store answered
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Command(err.to_string())
    }
}

/// Convenience Result type for store round trips.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// Callers branch on the variant: `NotFound` is an expected outcome,
/// `Connection` and `Validation` are actionable.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Store unreachable or authentication failed at construction
    #[error("Connection error: {0}")]
    Connection(String),

    /// Caller-supplied key, score or range is invalid
    #[error("Validation error: {0}")]
    Validation(String),

    /// Value cannot be represented in (or read back from) the wire format
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// First half of the dual write failed, nothing was written
    #[error("Index write failed for key {key}: {source}")]
    IndexWrite {
        key: String,
        #[source]
        source: StoreError,
    },

    /// Second half of the dual write failed, the index member remains
    #[error("Value write failed for key {key}: {source}")]
    ValueWrite {
        key: String,
        #[source]
        source: StoreError,
    },

    /// Key was never written or has expired
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Transport or protocol failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Operation attempted after close
    #[error("Cache is closed")]
    Closed,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
