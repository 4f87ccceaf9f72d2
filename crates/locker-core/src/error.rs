//! Error types for lock operations.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during lock operations.
#[derive(Error, Debug)]
pub enum LockError {
    /// The key is held by another token.
    ///
    /// Only returned by [`Locker::acquire`](crate::Locker::acquire); the lower
    /// layers report contention as [`Acquisition::Busy`](crate::Acquisition::Busy).
    #[error("lock conflict, key expires in {ttl:?}")]
    Conflict {
        /// Remaining time until the blocking entry expires.
        ttl: Duration,
    },

    /// Invalid locker configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Key (prefix included) rejected before reaching the store.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// The lock was already released and cannot be acquired again.
    #[error("lock was released")]
    Released,

    /// Store connection failed.
    #[error("connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Store command failed.
    #[error("backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The store answered with something the lock protocol does not allow.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),

    /// The random source could not produce a token.
    #[error("random source failed: {0}")]
    Random(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LockError {
    /// Returns `true` for [`LockError::Conflict`].
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Remaining TTL carried by a conflict.
    pub fn conflict_ttl(&self) -> Option<Duration> {
        match self {
            Self::Conflict { ttl } => Some(*ttl),
            _ => None,
        }
    }
}

/// Replies from a store that break the lock protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Reply of an unexpected type or range.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The key exists without an expiry, so it was not written by a locker.
    #[error("key name clash: {0}")]
    KeyNameClash(String),
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;
