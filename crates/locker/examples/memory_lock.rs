//! Example: Several tasks contending for one in-memory lock
//!
//! Run with: `cargo run --example memory_lock`

use locker::*;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let gateway = MemoryGateway::spawn(Duration::from_millis(100));
    let locker = Locker::builder(gateway.clone())
        .ttl(Duration::from_millis(200))
        .retry_count(20)
        .retry_delay(Duration::from_millis(50))
        .retry_jitter(Duration::from_millis(20))
        .prefix("lock#")
        .build()?;

    let mut workers = Vec::new();
    for id in 0..3 {
        let locker = locker.clone();
        workers.push(tokio::spawn(async move {
            match locker.acquire("report").await {
                Ok(mut lock) => {
                    println!("worker {id}: lock acquired");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    let released = lock.unlock().await?;
                    println!("worker {id}: lock released ({released})");
                }
                Err(LockError::Conflict { ttl }) => {
                    println!("worker {id}: gave up, key busy for another {ttl:?}");
                }
                Err(e) => return Err(e),
            }
            Ok::<_, LockError>(())
        }));
    }

    for worker in workers {
        worker.await??;
    }

    gateway.stop().await;
    Ok(())
}
