//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use locker::{Acquisition, Gateway, LockResult};

/// Gateway wrapper counting the calls reaching the inner gateway.
#[derive(Clone)]
pub struct CountingGateway<G> {
    inner: G,
    acquires: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
}

impl<G: Gateway> CountingGateway<G> {
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            acquires: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn acquires(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl<G: Gateway> Gateway for CountingGateway<G> {
    async fn acquire(&self, key: &str, token: &str, ttl: Duration) -> LockResult<Acquisition> {
        self.acquires.fetch_add(1, Ordering::SeqCst);
        self.inner.acquire(key, token, ttl).await
    }

    async fn release(&self, key: &str, token: &str) -> LockResult<bool> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        self.inner.release(key, token).await
    }
}
