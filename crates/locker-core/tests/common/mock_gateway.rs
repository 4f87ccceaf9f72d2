//! Scripted gateway recording every call.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use locker_core::error::{LockError, LockResult};
use locker_core::gateway::{Acquisition, Gateway};
use parking_lot::Mutex;

/// Arguments of one `acquire` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireCall {
    pub key: String,
    pub token: String,
    pub ttl: Duration,
}

/// Arguments of one `release` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCall {
    pub key: String,
    pub token: String,
}

#[derive(Debug, Default)]
struct MockState {
    acquire_replies: VecDeque<LockResult<Acquisition>>,
    acquire_fallback: Option<Acquisition>,
    release_replies: VecDeque<LockResult<bool>>,
    acquire_calls: Vec<AcquireCall>,
    release_calls: Vec<ReleaseCall>,
}

/// Gateway answering from queued replies.
///
/// Queued replies are consumed first; once empty, `acquire` answers with the
/// fallback (default `Acquired`) and `release` answers `true`.
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    /// Creates a mock answering `Acquired` and `true`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one `acquire` reply.
    pub fn push_acquire(&self, reply: Acquisition) -> &Self {
        self.state.lock().acquire_replies.push_back(Ok(reply));
        self
    }

    /// Queues one `acquire` failure.
    pub fn push_acquire_error(&self, error: LockError) -> &Self {
        self.state.lock().acquire_replies.push_back(Err(error));
        self
    }

    /// Answer used once the `acquire` queue is empty.
    pub fn always_acquire(&self, reply: Acquisition) -> &Self {
        self.state.lock().acquire_fallback = Some(reply);
        self
    }

    /// Queues one `release` reply.
    pub fn push_release(&self, reply: bool) -> &Self {
        self.state.lock().release_replies.push_back(Ok(reply));
        self
    }

    /// Queues one `release` failure.
    pub fn push_release_error(&self, error: LockError) -> &Self {
        self.state.lock().release_replies.push_back(Err(error));
        self
    }

    pub fn acquire_calls(&self) -> Vec<AcquireCall> {
        self.state.lock().acquire_calls.clone()
    }

    pub fn release_calls(&self) -> Vec<ReleaseCall> {
        self.state.lock().release_calls.clone()
    }
}

impl Gateway for MockGateway {
    async fn acquire(&self, key: &str, token: &str, ttl: Duration) -> LockResult<Acquisition> {
        let mut state = self.state.lock();
        state.acquire_calls.push(AcquireCall {
            key: key.to_string(),
            token: token.to_string(),
            ttl,
        });
        match state.acquire_replies.pop_front() {
            Some(reply) => reply,
            None => Ok(state.acquire_fallback.unwrap_or(Acquisition::Acquired)),
        }
    }

    async fn release(&self, key: &str, token: &str) -> LockResult<bool> {
        let mut state = self.state.lock();
        state.release_calls.push(ReleaseCall {
            key: key.to_string(),
            token: token.to_string(),
        });
        state.release_replies.pop_front().unwrap_or(Ok(true))
    }
}

/// A transport-looking failure.
pub fn backend_error(message: &str) -> LockError {
    LockError::Backend(Box::new(std::io::Error::other(message.to_string())))
}
