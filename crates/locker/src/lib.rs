//! Token-based distributed locks for Rust.
//!
//! A lock is one key in a shared store holding a random token. Only the
//! holder of the token can extend or release the key, and the key expires
//! on its own after a TTL, so a crashed holder cannot block others forever.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use locker::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a gateway (example: Redis backend)
//!     let gateway = RedisGateway::connect("redis://localhost:6379").await?;
//!
//!     // Configure once
//!     let locker = Locker::builder(gateway)
//!         .ttl(Duration::from_secs(5))
//!         .retry_count(10)
//!         .retry_delay(Duration::from_millis(100))
//!         .retry_jitter(Duration::from_millis(20))
//!         .prefix("lock#")
//!         .build()?;
//!
//!     // Acquire, failing with `LockError::Conflict` if the key stays busy
//!     let mut lock = locker.acquire("my-resource").await?;
//!
//!     // Critical section - we hold the key for up to 5 seconds
//!     println!("Doing critical work...");
//!
//!     // Extend, then release
//!     lock.lock().await?;
//!     lock.unlock().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Backends
//!
//! ## Memory Backend
//!
//! Keeps entries in process memory; a background task sweeps expired ones.
//!
//! ```rust,no_run
//! # async fn run() {
//! use locker::MemoryGateway;
//! use std::time::Duration;
//!
//! let gateway = MemoryGateway::spawn(Duration::from_millis(100));
//! // ...
//! gateway.stop().await;
//! # }
//! ```
//!
//! ## Redis Backend
//!
//! One Redis key per lock, checked and updated by Lua scripts.
//!
//! # Crate Organization
//!
//! This is a meta-crate that re-exports types from:
//! - `locker-core`: gateway contract, locks, locker, retry policy
//! - `locker-memory`: in-memory backend
//! - `locker-redis`: Redis backend

// Re-export core types and traits
pub use locker_core::prelude::*;
pub use locker_core::{error, gateway, lock, options, retry, token};

// Re-export memory backend
pub use locker_memory::{EntrySnapshot, MemoryGateway};

// Re-export redis backend
pub use locker_redis::RedisGateway;
