//! Key table behind the memory gateway.

use std::collections::HashMap;
use std::time::Duration;

use locker_core::gateway::Acquisition;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    token: String,
    expires_at: Instant,
}

impl Entry {
    /// Time left before expiry, `None` once expired.
    fn remaining(&self, now: Instant) -> Option<Duration> {
        let left = self.expires_at.saturating_duration_since(now);
        (!left.is_zero()).then_some(left)
    }
}

/// Live entry as seen from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySnapshot {
    /// Token holding the key.
    pub token: String,
    /// Time left before the entry expires.
    pub ttl: Duration,
}

/// Key to (token, expiry) table.
///
/// Not synchronised; the gateway wraps it in a mutex so each method runs as
/// one atomic step. Expiry is checked on every access, so the result of a
/// call never depends on whether [`Storage::remove_expired`] ran.
#[derive(Debug, Default)]
pub(crate) struct Storage {
    entries: HashMap<String, Entry>,
}

impl Storage {
    pub(crate) fn acquire(&mut self, key: &str, token: &str, ttl: Duration, now: Instant) -> Acquisition {
        let expires_at = now + ttl;
        if let Some(entry) = self.entries.get_mut(key)
            && let Some(remaining) = entry.remaining(now)
        {
            if entry.token != token {
                return Acquisition::Busy { ttl: remaining };
            }
            entry.expires_at = expires_at;
            return Acquisition::Extended;
        }
        self.entries.insert(
            key.to_string(),
            Entry {
                token: token.to_string(),
                expires_at,
            },
        );
        Acquisition::Acquired
    }

    pub(crate) fn release(&mut self, key: &str, token: &str, now: Instant) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.token == token => {
                let live = entry.remaining(now).is_some();
                self.entries.remove(key);
                live
            }
            _ => false,
        }
    }

    /// Drops every expired entry, returning how many were dropped.
    pub(crate) fn remove_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.remaining(now).is_some());
        before - self.entries.len()
    }

    pub(crate) fn get(&self, key: &str, now: Instant) -> Option<EntrySnapshot> {
        let entry = self.entries.get(key)?;
        let ttl = entry.remaining(now)?;
        Some(EntrySnapshot {
            token: entry.token.clone(),
            ttl,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
