use anyhow::Result;
use futures::future::join_all;
use stash_client::StashClient;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVER_URL: &str = "http://127.0.0.1:50051";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stash_integration_tests=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🧪 Stash Integration Tests");
    tracing::info!("   Server: {}", SERVER_URL);
    println!();

    // Run all tests
    test_basic_operations().await?;
    test_missing_key().await?;
    test_parallel_set_get().await?;
    test_expiration().await?;
    test_overwrite_clears_ttl().await?;

    println!();
    tracing::info!("✅ All tests passed!");

    Ok(())
}

/// Test basic SET/GET round trips
async fn test_basic_operations() -> Result<()> {
    tracing::info!("Test: Basic Operations");

    let client = StashClient::connect(SERVER_URL).await?;

    let key = format!("basic-test-{}", uuid::Uuid::new_v4());
    let value = "hello world";

    client.set(key.clone(), value, Some(60)).await?;

    let retrieved = client.get(key.clone()).await?;
    assert_eq!(retrieved.as_deref(), Some(value), "Value should match");

    // A never-expiring entry
    let pinned_key = format!("pinned-test-{}", uuid::Uuid::new_v4());
    client.set(pinned_key.clone(), "forever", None).await?;
    let retrieved = client.get(pinned_key).await?;
    assert_eq!(retrieved.as_deref(), Some("forever"));

    tracing::info!("   ✓ Basic operations work correctly");
    Ok(())
}

/// Test that a key that was never set reports not-found
async fn test_missing_key() -> Result<()> {
    tracing::info!("Test: Missing Key");

    let client = StashClient::connect(SERVER_URL).await?;

    let key = format!("missing-test-{}", uuid::Uuid::new_v4());
    let retrieved = client.get(key).await?;
    assert!(retrieved.is_none(), "Unset key should not be found");

    tracing::info!("   ✓ Missing keys report not-found");
    Ok(())
}

/// Test parallel SET and GET operations - verify no data mixing
async fn test_parallel_set_get() -> Result<()> {
    tracing::info!("Test: Parallel SET/GET (500 concurrent operations)");

    let num_operations = 500;
    let start = Instant::now();

    let client = StashClient::connect(SERVER_URL).await?;

    // Create unique key-value pairs
    let test_data: Vec<(String, String)> = (0..num_operations)
        .map(|i| {
            let key = format!("parallel-test-{}-{}", i, uuid::Uuid::new_v4());
            let value = format!("value-{}-{}", i, uuid::Uuid::new_v4());
            (key, value)
        })
        .collect();

    // Parallel SET operations
    let set_futures: Vec<_> = test_data
        .iter()
        .map(|(key, value)| {
            let client = client.clone();
            let key = key.clone();
            let value = value.clone();
            async move { client.set(key, value, Some(300)).await }
        })
        .collect();

    for result in join_all(set_futures).await {
        result?;
    }

    // Parallel GET operations - every key must come back with its own value
    let get_futures: Vec<_> = test_data
        .iter()
        .map(|(key, value)| {
            let client = client.clone();
            let key = key.clone();
            let value = value.clone();
            async move {
                let retrieved = client.get(key).await?;
                anyhow::ensure!(
                    retrieved.as_deref() == Some(value.as_str()),
                    "value mismatch: got {:?}, expected {:?}",
                    retrieved,
                    value
                );
                Ok(())
            }
        })
        .collect();

    for result in join_all(get_futures).await {
        result?;
    }

    tracing::info!(
        "   ✓ {} parallel operations completed in {:?} with no data mixing",
        num_operations,
        start.elapsed()
    );
    Ok(())
}

/// Test that entries expire after their TTL
async fn test_expiration() -> Result<()> {
    tracing::info!("Test: TTL Expiration");

    let client = StashClient::connect(SERVER_URL).await?;

    let key = format!("expiry-test-{}", uuid::Uuid::new_v4());
    client.set(key.clone(), "short-lived", Some(1)).await?;

    // Visible before the TTL elapses
    let retrieved = client.get(key.clone()).await?;
    assert_eq!(retrieved.as_deref(), Some("short-lived"));

    tokio::time::sleep(Duration::from_secs(2)).await;

    // Expired: indistinguishable from a missing key
    let retrieved = client.get(key).await?;
    assert!(retrieved.is_none(), "Key should have expired");

    tracing::info!("   ✓ Entries expire after their TTL");
    Ok(())
}

/// Test that an overwrite replaces the TTL along with the value
async fn test_overwrite_clears_ttl() -> Result<()> {
    tracing::info!("Test: Overwrite Clears TTL");

    let client = StashClient::connect(SERVER_URL).await?;

    let key = format!("overwrite-test-{}", uuid::Uuid::new_v4());
    client.set(key.clone(), "a", Some(1)).await?;
    client.set(key.clone(), "b", None).await?;

    tokio::time::sleep(Duration::from_secs(2)).await;

    // The second write had no TTL, overriding the first
    let retrieved = client.get(key).await?;
    assert_eq!(retrieved.as_deref(), Some("b"), "Overwrite should clear the TTL");

    tracing::info!("   ✓ Overwrites replace the TTL");
    Ok(())
}
