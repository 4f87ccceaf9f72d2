//! Core traits and types for token-based distributed locks.
//!
//! A [`Locker`] hands out [`Lock`]s. Each lock owns a random [`Token`] and
//! talks to the store through a [`Gateway`], whose `acquire` and `release`
//! are atomic compare-and-set operations on one key.

pub mod error;
pub mod gateway;
pub mod lock;
pub mod locker;
pub mod options;
pub mod prelude;
pub mod retry;
pub mod token;

pub use error::{LockError, LockResult, ProtocolError};
pub use prelude::*;
