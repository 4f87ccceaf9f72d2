//! Lua scripts and reply decoding.

use std::time::Duration;

use fred::prelude::*;
use locker_core::error::{LockResult, ProtocolError};
use locker_core::gateway::Acquisition;

/// Reply of [`ACQUIRE_SCRIPT`] when the key was set.
const ACQUIRED: i64 = -2;
/// Reply of [`ACQUIRE_SCRIPT`] when the expiry of our own key was refreshed.
const EXTENDED: i64 = -3;
/// `PTTL` of a key without expiry.
const NO_EXPIRY: i64 = -1;

/// Sets the key if absent, refreshes it if it holds our token, otherwise
/// returns its remaining TTL in milliseconds.
///
/// KEYS[1] = key, ARGV[1] = token, ARGV[2] = ttl in milliseconds.
pub(crate) const ACQUIRE_SCRIPT: &str = r#"
    local v = redis.call('get', KEYS[1])
    if v == false then
        redis.call('set', KEYS[1], ARGV[1], 'px', ARGV[2])
        return -2
    end
    if v == ARGV[1] then
        redis.call('pexpire', KEYS[1], ARGV[2])
        return -3
    end
    return redis.call('pttl', KEYS[1])
"#;

/// Deletes the key if it holds our token.
///
/// KEYS[1] = key, ARGV[1] = token.
pub(crate) const RELEASE_SCRIPT: &str = r#"
    if redis.call('get', KEYS[1]) == ARGV[1] then
        return redis.call('del', KEYS[1])
    end
    return 0
"#;

/// Decodes the reply of [`ACQUIRE_SCRIPT`].
pub(crate) fn decode_acquire(key: &str, reply: RedisValue) -> LockResult<Acquisition> {
    let n = match reply {
        RedisValue::Integer(n) => n,
        other => {
            return Err(ProtocolError::InvalidResponse(format!(
                "acquire on {key} returned {other:?}"
            ))
            .into());
        }
    };
    match n {
        ACQUIRED => Ok(Acquisition::Acquired),
        EXTENDED => Ok(Acquisition::Extended),
        NO_EXPIRY => Err(ProtocolError::KeyNameClash(key.to_string()).into()),
        // PTTL rounds down, so a live key can report 0
        n if n >= 0 => Ok(Acquisition::Busy {
            ttl: Duration::from_millis(n.max(1) as u64),
        }),
        n => Err(ProtocolError::InvalidResponse(format!("acquire on {key} returned {n}")).into()),
    }
}

/// Decodes the reply of [`RELEASE_SCRIPT`].
pub(crate) fn decode_release(key: &str, reply: RedisValue) -> LockResult<bool> {
    match reply {
        RedisValue::Integer(1) => Ok(true),
        RedisValue::Integer(0) => Ok(false),
        other => Err(ProtocolError::InvalidResponse(format!(
            "release on {key} returned {other:?}"
        ))
        .into()),
    }
}
