//! Convenience prelude for lock types.

pub use crate::error::{LockError, LockResult, ProtocolError};
pub use crate::gateway::{Acquisition, Gateway, ttl_millis};
pub use crate::lock::Lock;
pub use crate::locker::{DEFAULT_RANDOM_BYTES_SIZE, Locker, LockerBuilder, MAX_KEY_SIZE};
pub use crate::options::LockerOptions;
pub use crate::retry::{RetryPolicy, jittered_delay, jittered_delay_with};
pub use crate::token::{OsRandom, RandomSource, Token};
