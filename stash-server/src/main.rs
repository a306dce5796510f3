mod service;

use service::StashService;
use stash_core::{Store, StoreConfig};
use stash_proto::stash_server::StashServer;
use std::time::Duration;
use tonic::transport::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stash_server=info,tonic=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration from environment variables
    let host = std::env::var("STASH_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("STASH_PORT").unwrap_or_else(|_| "50051".to_string());
    let sweep_interval: u64 = std::env::var("STASH_SWEEP_INTERVAL")
        .unwrap_or_else(|_| "30".to_string())
        .parse()
        .unwrap_or(30);

    let addr = format!("{}:{}", host, port).parse()?;

    // Create the store with configuration
    let config = StoreConfig::default().with_sweep_interval(Duration::from_secs(sweep_interval));
    let store = Store::with_config(config);

    let service = StashService::new(store.clone());

    tracing::info!("🚀 Stash gRPC server listening on {}", addr);
    tracing::info!("   Sweep interval: {}s", sweep_interval);

    Server::builder()
        .add_service(StashServer::new(service))
        .serve_with_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    // Stop the reclaimer and wait for its current sweep before exiting
    store.shutdown().await;

    Ok(())
}
