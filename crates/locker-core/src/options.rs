//! Deserializable locker settings.

use std::time::Duration;

use serde::Deserialize;

use crate::locker::{DEFAULT_RANDOM_BYTES_SIZE, MAX_KEY_SIZE};

/// Locker settings in plain numbers, for loading from configuration files.
///
/// Durations are integer milliseconds. Only `ttl_ms` is required.
///
/// ```rust,ignore
/// let options: LockerOptions = serde_json::from_str(r#"{"ttl_ms": 5000, "prefix": "lock#"}"#)?;
/// let locker = Locker::from_options(gateway, &options)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LockerOptions {
    /// TTL of a lock entry. Must be greater than 0.
    pub ttl_ms: u64,
    /// Retries while the key is busy.
    #[serde(default)]
    pub retry_count: u32,
    /// Delay between retries.
    #[serde(default)]
    pub retry_delay_ms: u64,
    /// Maximum random deviation from the retry delay.
    #[serde(default)]
    pub retry_jitter_ms: u64,
    /// Prepended to every key.
    #[serde(default)]
    pub prefix: String,
    /// Random bytes per token. Must be greater than 0.
    #[serde(default = "default_random_bytes_size")]
    pub random_bytes_size: usize,
    /// Maximum key size in bytes, prefix included.
    #[serde(default = "default_max_key_size")]
    pub max_key_size: usize,
}

impl LockerOptions {
    /// Options with the given TTL and every other field defaulted.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
            retry_count: 0,
            retry_delay_ms: 0,
            retry_jitter_ms: 0,
            prefix: String::new(),
            random_bytes_size: DEFAULT_RANDOM_BYTES_SIZE,
            max_key_size: MAX_KEY_SIZE,
        }
    }
}

fn default_random_bytes_size() -> usize {
    DEFAULT_RANDOM_BYTES_SIZE
}

fn default_max_key_size() -> usize {
    MAX_KEY_SIZE
}
