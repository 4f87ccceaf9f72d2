//! Lock factory and its configuration.

use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use crate::error::{LockError, LockResult};
use crate::gateway::{Acquisition, Gateway, ttl_millis};
use crate::lock::Lock;
use crate::options::LockerOptions;
use crate::retry::RetryPolicy;
use crate::token::{OsRandom, RandomSource, Token};

/// Maximum key size in bytes (512 MB), prefix included.
pub const MAX_KEY_SIZE: usize = 512_000_000;

/// Random bytes read per token unless configured otherwise.
pub const DEFAULT_RANDOM_BYTES_SIZE: usize = 16;

/// Builder for [`Locker`] configuration.
pub struct LockerBuilder<G: Gateway> {
    gateway: G,
    ttl: Option<Duration>,
    retry: RetryPolicy,
    prefix: String,
    random_bytes_size: usize,
    max_key_size: usize,
    random: Arc<dyn RandomSource>,
}

impl<G: Gateway> LockerBuilder<G> {
    /// Creates a builder with default settings. A TTL must still be set.
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            ttl: None,
            retry: RetryPolicy::none(),
            prefix: String::new(),
            random_bytes_size: DEFAULT_RANDOM_BYTES_SIZE,
            max_key_size: MAX_KEY_SIZE,
            random: Arc::new(OsRandom),
        }
    }

    /// Sets the TTL of every lock entry. Required, at least 1 ms.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets how many times a busy key is retried after the first attempt.
    pub fn retry_count(mut self, count: u32) -> Self {
        self.retry.count = count;
        self
    }

    /// Sets the delay between retries.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry.delay = delay;
        self
    }

    /// Sets the maximum random deviation from the retry delay.
    ///
    /// Spreads out retries of clients that collided on the same key.
    pub fn retry_jitter(mut self, jitter: Duration) -> Self {
        self.retry.jitter = jitter;
        self
    }

    /// Sets the prefix prepended to every key.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets how many random bytes make up a token.
    pub fn random_bytes_size(mut self, size: usize) -> Self {
        self.random_bytes_size = size;
        self
    }

    /// Sets the maximum key size in bytes, prefix included.
    pub fn max_key_size(mut self, size: usize) -> Self {
        self.max_key_size = size;
        self
    }

    /// Replaces the OS random generator used for tokens.
    pub fn random_source(mut self, source: impl RandomSource + 'static) -> Self {
        self.random = Arc::new(source);
        self
    }

    /// Builds the locker.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::InvalidConfig`] if the TTL is missing, shorter than
    /// a millisecond or too large for the store, or if a size is zero.
    /// Returns [`LockError::InvalidKey`] if the prefix alone is too long.
    pub fn build(self) -> LockResult<Locker<G>> {
        let ttl = self
            .ttl
            .ok_or_else(|| LockError::InvalidConfig("ttl must be set".to_string()))?;
        ttl_millis(ttl)?;
        if self.random_bytes_size == 0 {
            return Err(LockError::InvalidConfig(
                "random bytes size must be greater than 0".to_string(),
            ));
        }
        if self.max_key_size == 0 {
            return Err(LockError::InvalidConfig(
                "max key size must be greater than 0".to_string(),
            ));
        }
        check_key_size(&self.prefix, self.max_key_size)?;

        Ok(Locker {
            gateway: self.gateway,
            ttl,
            retry: self.retry,
            prefix: self.prefix,
            random_bytes_size: self.random_bytes_size,
            max_key_size: self.max_key_size,
            random: self.random,
        })
    }
}

/// Factory for [`Lock`]s sharing one gateway and one configuration.
///
/// # Example
///
/// ```rust,ignore
/// let locker = Locker::builder(gateway)
///     .ttl(Duration::from_secs(5))
///     .retry_count(10)
///     .retry_delay(Duration::from_millis(100))
///     .retry_jitter(Duration::from_millis(20))
///     .prefix("lock#")
///     .build()?;
///
/// let (mut lock, outcome) = locker.lock("orders").await?;
/// if outcome.is_ok() {
///     process_orders().await;
///     lock.unlock().await?;
/// }
/// ```
#[derive(Clone)]
pub struct Locker<G: Gateway> {
    gateway: G,
    ttl: Duration,
    retry: RetryPolicy,
    prefix: String,
    random_bytes_size: usize,
    max_key_size: usize,
    random: Arc<dyn RandomSource>,
}

impl<G: Gateway> Locker<G> {
    /// Returns a new builder for configuring a locker on `gateway`.
    pub fn builder(gateway: G) -> LockerBuilder<G> {
        LockerBuilder::new(gateway)
    }

    /// Creates a locker from deserialized options.
    pub fn from_options(gateway: G, options: &LockerOptions) -> LockResult<Self> {
        Self::builder(gateway)
            .ttl(Duration::from_millis(options.ttl_ms))
            .retry_count(options.retry_count)
            .retry_delay(Duration::from_millis(options.retry_delay_ms))
            .retry_jitter(Duration::from_millis(options.retry_jitter_ms))
            .prefix(options.prefix.clone())
            .random_bytes_size(options.random_bytes_size)
            .max_key_size(options.max_key_size)
            .build()
    }

    /// The gateway shared by every lock of this locker.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// TTL of every lock entry.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Key prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Retry settings applied by every lock.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Creates a lock on `key` with a fresh token, without acquiring it.
    ///
    /// # Errors
    ///
    /// [`LockError::InvalidKey`] if the prefixed key exceeds the maximum size;
    /// the store is not contacted in that case.
    pub fn create_lock(&self, key: &str) -> LockResult<Lock<G>> {
        let key = format!("{}{}", self.prefix, key);
        check_key_size(&key, self.max_key_size)?;
        let token = Token::generate(self.random.as_ref(), self.random_bytes_size)?;
        Ok(Lock::new(self.gateway.clone(), key, token, self.ttl, self.retry))
    }

    /// Creates a lock on `key` and tries to acquire it.
    ///
    /// The lock is returned even when the key stayed busy, together with the
    /// outcome of the last attempt, so the caller can retry it later.
    #[instrument(skip(self), fields(prefix = %self.prefix))]
    pub async fn lock(&self, key: &str) -> LockResult<(Lock<G>, Acquisition)> {
        let mut lock = self.create_lock(key)?;
        let outcome = lock.lock().await?;
        Ok((lock, outcome))
    }

    /// Creates a lock on `key` and acquires it, failing on contention.
    ///
    /// # Errors
    ///
    /// [`LockError::Conflict`] carrying the remaining TTL of the holder if the
    /// key is still busy after the last retry.
    pub async fn acquire(&self, key: &str) -> LockResult<Lock<G>> {
        let (lock, outcome) = self.lock(key).await?;
        match outcome {
            Acquisition::Busy { ttl } => Err(LockError::Conflict { ttl }),
            Acquisition::Acquired | Acquisition::Extended => Ok(lock),
        }
    }
}

impl<G: Gateway + std::fmt::Debug> std::fmt::Debug for Locker<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Locker")
            .field("gateway", &self.gateway)
            .field("ttl", &self.ttl)
            .field("retry", &self.retry)
            .field("prefix", &self.prefix)
            .field("random_bytes_size", &self.random_bytes_size)
            .field("max_key_size", &self.max_key_size)
            .finish_non_exhaustive()
    }
}

fn check_key_size(key: &str, max: usize) -> LockResult<()> {
    if key.len() > max {
        return Err(LockError::InvalidKey(format!(
            "key size {} exceeds {} bytes",
            key.len(),
            max
        )));
    }
    Ok(())
}
