//! In-memory backend for locker.
//!
//! Useful for tests and for locking between tasks of a single process.

pub mod gateway;
pub mod storage;

pub use gateway::{DEFAULT_SWEEP_INTERVAL, MemoryGateway};
pub use storage::EntrySnapshot;
