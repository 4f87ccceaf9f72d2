//! Store contract for lock state.

use std::future::Future;
use std::time::Duration;

use crate::error::{LockError, LockResult};

// ============================================================================
// Acquisition
// ============================================================================

/// Outcome of a single `acquire` against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    /// The key was free; a new entry now belongs to the token.
    Acquired,
    /// The token already held the key; its expiry was pushed forward.
    Extended,
    /// Another token holds the key.
    Busy {
        /// Time left until the blocking entry expires.
        ttl: Duration,
    },
}

impl Acquisition {
    /// Returns `true` if the token holds the key after the call.
    pub fn is_ok(&self) -> bool {
        !self.is_busy()
    }

    /// Returns `true` if another token holds the key.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }

    /// Remaining TTL of the blocking entry, only set for [`Acquisition::Busy`].
    pub fn ttl(&self) -> Option<Duration> {
        match self {
            Self::Busy { ttl } => Some(*ttl),
            _ => None,
        }
    }
}

// ============================================================================
// Gateway Trait
// ============================================================================

/// Gateway to the store holding lock entries.
///
/// Each method is one indivisible read-modify-write on a single key. An
/// implementation must never let two callers interleave inside `acquire` for
/// the same key, otherwise two tokens could both observe success.
///
/// Gateways are cheap handles to a shared store, so they are `Clone`; every
/// [`Lock`](crate::Lock) carries its own clone.
///
/// # Example
///
/// ```rust,ignore
/// match gateway.acquire("lock#orders", token.as_str(), Duration::from_secs(5)).await? {
///     Acquisition::Acquired | Acquisition::Extended => do_work().await,
///     Acquisition::Busy { ttl } => eprintln!("busy for another {ttl:?}"),
/// }
/// ```
pub trait Gateway: Clone + Send + Sync + 'static {
    /// Sets `key` to `token` with `ttl` if the key has no live entry, or
    /// refreshes the expiry if the live entry already holds `token`.
    ///
    /// # Returns
    ///
    /// * `Ok(Acquisition::Acquired)` - New entry created
    /// * `Ok(Acquisition::Extended)` - Existing entry of the same token renewed
    /// * `Ok(Acquisition::Busy { ttl })` - Held by another token for `ttl` more
    /// * `Err(LockError::Backend)` / `Err(LockError::Connection)` - Transport failure
    /// * `Err(LockError::Protocol)` - Store answered outside the protocol
    fn acquire(
        &self,
        key: &str,
        token: &str,
        ttl: Duration,
    ) -> impl Future<Output = LockResult<Acquisition>> + Send;

    /// Deletes `key` if its live entry holds `token`.
    ///
    /// Returns `Ok(false)` when the key is absent, expired or owned by another
    /// token; a foreign entry is never removed.
    fn release(&self, key: &str, token: &str) -> impl Future<Output = LockResult<bool>> + Send;
}

/// Whole milliseconds of a lock TTL, as stores expect it.
///
/// # Errors
///
/// [`LockError::InvalidConfig`] if `ttl` is under one millisecond or its
/// millisecond count does not fit in an `i64`.
pub fn ttl_millis(ttl: Duration) -> LockResult<i64> {
    let millis = i64::try_from(ttl.as_millis()).map_err(|_| {
        LockError::InvalidConfig(format!("ttl must not exceed {} milliseconds", i64::MAX))
    })?;
    if millis == 0 {
        return Err(LockError::InvalidConfig(
            "ttl must be greater than 0 milliseconds".to_string(),
        ));
    }
    Ok(millis)
}
