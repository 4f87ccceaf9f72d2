//! Tests for the memory gateway contract and its sweep lifecycle.

use std::time::Duration;

use locker_core::error::LockError;
use locker_core::gateway::{Acquisition, Gateway};
use locker_memory::MemoryGateway;

const TTL: Duration = Duration::from_millis(50);

#[tokio::test(start_paused = true)]
async fn test_acquire_extend_busy() {
    let gateway = MemoryGateway::new(Duration::from_millis(100));

    assert_eq!(gateway.acquire("k", "a", TTL).await.unwrap(), Acquisition::Acquired);
    assert_eq!(gateway.acquire("k", "a", TTL).await.unwrap(), Acquisition::Extended);

    tokio::time::sleep(Duration::from_millis(20)).await;
    let outcome = gateway.acquire("k", "b", TTL).await.unwrap();
    let ttl = outcome.ttl().unwrap();
    assert!(ttl > Duration::ZERO && ttl <= Duration::from_millis(30), "{ttl:?}");
}

#[tokio::test(start_paused = true)]
async fn test_release_twice() {
    let gateway = MemoryGateway::default();
    gateway.acquire("k", "a", TTL).await.unwrap();

    assert!(!gateway.release("k", "b").await.unwrap());
    assert!(gateway.release("k", "a").await.unwrap());
    assert!(!gateway.release("k", "a").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_expired_key_can_be_taken() {
    let gateway = MemoryGateway::default();
    gateway.acquire("k", "a", TTL).await.unwrap();

    tokio::time::sleep(TTL).await;
    assert_eq!(gateway.acquire("k", "b", TTL).await.unwrap(), Acquisition::Acquired);
    assert!(!gateway.release("k", "a").await.unwrap());
    assert_eq!(gateway.entry("k").map(|e| e.token), Some("b".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_sweep_reclaims_abandoned_keys() {
    let gateway = MemoryGateway::spawn(Duration::from_millis(100));
    assert!(gateway.is_running());

    gateway.acquire("a", "t1", TTL).await.unwrap();
    gateway.acquire("b", "t2", Duration::from_secs(10)).await.unwrap();
    assert_eq!(gateway.len(), 2);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(gateway.len(), 1);
    assert!(gateway.entry("b").is_some());

    gateway.stop().await;
    assert!(!gateway.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_stopped_gateway_keeps_expired_entries_invisible() {
    let gateway = MemoryGateway::new(Duration::from_millis(10));
    gateway.acquire("k", "a", TTL).await.unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(gateway.len(), 1);
    assert!(gateway.entry("k").is_none());
    assert_eq!(gateway.sweep(), 1);
    assert!(gateway.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_start_and_stop_are_idempotent() {
    let gateway = MemoryGateway::new(Duration::from_millis(10));
    gateway.stop().await;
    assert!(!gateway.is_running());

    gateway.start();
    gateway.start();
    assert!(gateway.is_running());

    gateway.stop().await;
    gateway.stop().await;
    assert!(!gateway.is_running());

    // A stopped sweep no longer removes anything.
    gateway.acquire("k", "a", TTL).await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(gateway.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_clones_share_the_table() {
    let gateway = MemoryGateway::default();
    let other = gateway.clone();

    gateway.acquire("k", "a", TTL).await.unwrap();
    assert!(other.acquire("k", "b", TTL).await.unwrap().is_busy());
    assert!(other.release("k", "a").await.unwrap());
    assert!(gateway.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_out_of_range_ttl_rejected() {
    let gateway = MemoryGateway::default();
    for ttl in [Duration::MAX, Duration::from_secs(u64::MAX / 2), Duration::ZERO] {
        let err = gateway.acquire("k", "a", ttl).await.unwrap_err();
        assert!(matches!(err, LockError::InvalidConfig(_)), "{ttl:?}");
    }
    assert!(gateway.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_zero_sweep_interval_raised() {
    let gateway = MemoryGateway::new(Duration::ZERO);
    assert_eq!(gateway.sweep_interval(), Duration::from_millis(1));

    gateway.start();
    gateway.acquire("k", "a", Duration::from_millis(5)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(gateway.is_empty());
    gateway.stop().await;
}
