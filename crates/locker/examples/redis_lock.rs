//! Example: Using Redis locks
//!
//! Run with: `cargo run --example redis_lock`
//!
//! Requires a Redis server. Set REDIS_URL environment variable
//! or modify the URL below.

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

    // Get Redis URL from environment or use default
    let redis_url = std::env::var("REDIS_URL")
        .unwrap_or_else(|_| "redis://localhost:6379".to_string());

    println!("Connecting to Redis...");
    let gateway = RedisGateway::connect(&redis_url).await?;

    let locker = Locker::builder(gateway.clone())
        .ttl(Duration::from_secs(2))
        .retry_count(5)
        .retry_delay(Duration::from_millis(200))
        .prefix("lock#")
        .build()?;

    // Acquire without raising on contention
    let (mut lock, outcome) = locker.lock("example-resource").await?;
    match outcome {
        Acquisition::Busy { ttl } => {
            println!("Key busy, retry in {ttl:?}");
            return Ok(());
        }
        _ => println!("Lock acquired: {}", lock.key()),
    }

    // Work longer than the TTL, extending as we go
    for step in 0..3 {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let outcome = lock.lock().await?;
        println!("Step {step}: {outcome:?}");
    }

    // Release the lock
    let released = lock.unlock().await?;
    println!("Lock released: {released}");

    gateway.disconnect().await?;
    Ok(())
}
