//! Client-side lock handle.

use std::time::Duration;

use tracing::{Span, debug, field, instrument, warn};

use crate::error::{LockError, LockResult};
use crate::gateway::{Acquisition, Gateway};
use crate::retry::RetryPolicy;
use crate::token::Token;

/// Where a lock believes it stands. The store stays authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LockState {
    Unacquired,
    Held,
    Released,
}

/// A lock on one key, owned through a secret token.
///
/// Created by [`Locker::create_lock`](crate::Locker::create_lock) without
/// holding the key. [`lock`](Lock::lock) acquires it, and calling it again
/// while held extends the TTL with the same token. [`unlock`](Lock::unlock)
/// releases it for good: a released lock cannot be acquired again.
///
/// # Example
///
/// ```rust,ignore
/// let mut lock = locker.create_lock("orders")?;
/// if lock.lock().await?.is_ok() {
///     process_orders().await;
///     lock.lock().await?; // extend
///     lock.unlock().await?;
/// }
/// ```
pub struct Lock<G: Gateway> {
    gateway: G,
    key: String,
    token: Token,
    ttl: Duration,
    retry: RetryPolicy,
    state: LockState,
}

impl<G: Gateway> Lock<G> {
    pub(crate) fn new(gateway: G, key: String, token: Token, ttl: Duration, retry: RetryPolicy) -> Self {
        Self {
            gateway,
            key,
            token,
            ttl,
            retry,
            state: LockState::Unacquired,
        }
    }

    /// Full store key, prefix included.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Ownership token sent with every store call.
    pub fn token(&self) -> &Token {
        &self.token
    }

    /// TTL applied on every acquisition.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Whether the last acquisition succeeded and the lock was not unlocked since.
    ///
    /// This is a local belief; the entry may already have expired in the store.
    pub fn is_held(&self) -> bool {
        self.state == LockState::Held
    }

    /// Whether [`unlock`](Lock::unlock) was called on a held lock.
    pub fn is_released(&self) -> bool {
        self.state == LockState::Released
    }

    /// Acquires the key, or extends it if already held.
    ///
    /// Retries while the key is busy, up to the retry count, sleeping
    /// between attempts. Every attempt uses this lock's token.
    ///
    /// # Returns
    ///
    /// * `Ok(Acquisition::Acquired | Acquisition::Extended)` - Lock held
    /// * `Ok(Acquisition::Busy { ttl })` - Still busy after the last retry
    /// * `Err(LockError::Released)` - Lock was unlocked before
    /// * `Err(...)` - Store failure; no retry is attempted
    #[instrument(skip(self), fields(lock.key = %self.key, ttl = ?self.ttl, attempts = field::Empty, acquired = field::Empty))]
    pub async fn lock(&mut self) -> LockResult<Acquisition> {
        if self.state == LockState::Released {
            return Err(LockError::Released);
        }

        let was_held = self.state == LockState::Held;
        let mut attempts: u64 = 0;
        let mut retries_left = self.retry.count;

        loop {
            attempts += 1;
            let outcome = self
                .gateway
                .acquire(&self.key, self.token.as_str(), self.ttl)
                .await;
            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(e) => {
                    Span::current().record("attempts", attempts);
                    return Err(e);
                }
            };

            match outcome {
                Acquisition::Acquired | Acquisition::Extended => {
                    self.state = LockState::Held;
                    Span::current().record("attempts", attempts);
                    Span::current().record("acquired", true);
                    return Ok(outcome);
                }
                Acquisition::Busy { ttl } => {
                    if retries_left == 0 {
                        if was_held {
                            warn!(remaining = ?ttl, "lock was lost before it could be extended");
                        }
                        self.state = LockState::Unacquired;
                        Span::current().record("attempts", attempts);
                        Span::current().record("acquired", false);
                        return Ok(outcome);
                    }
                    retries_left -= 1;
                    let delay = self.retry.next_delay();
                    debug!(remaining = ?ttl, delay = ?delay, retries_left, "key busy, retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Releases the lock.
    ///
    /// Returns `Ok(false)` without touching the store if the lock is not held.
    /// Otherwise the lock is marked released before the store is asked, so
    /// a second call always returns `Ok(false)`.
    #[instrument(skip(self), fields(lock.key = %self.key))]
    pub async fn unlock(&mut self) -> LockResult<bool> {
        if self.state != LockState::Held {
            return Ok(false);
        }
        self.state = LockState::Released;
        let released = self.gateway.release(&self.key, self.token.as_str()).await?;
        if !released {
            debug!("store no longer held our entry");
        }
        Ok(released)
    }
}

impl<G: Gateway> std::fmt::Debug for Lock<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lock")
            .field("key", &self.key)
            .field("token", &self.token)
            .field("ttl", &self.ttl)
            .field("retry", &self.retry)
            .field("state", &self.state)
            .finish()
    }
}
