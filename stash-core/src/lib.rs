//! # Stash Core
//!
//! A concurrent in-memory key-value store with per-key TTL expiration.
//!
//! ## Features
//!
//! - Thread-safe storage using `DashMap` (sharded locks, parallel readers)
//! - Expired entries are removed lazily on read
//! - A background reclaimer task per store removes expired entries eagerly
//! - All keys and values are strings
//!
//! ## Example
//!
//! ```rust,no_run
//! use stash_core::{Store, StoreConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Create a store with the default config (30 second sweep interval)
//!     let store = Store::new();
//!
//!     // Or with a custom sweep interval
//!     let config = StoreConfig::default()
//!         .with_sweep_interval(Duration::from_secs(60));
//!     let store = Store::with_config(config);
//!
//!     // Store a value with a 60 second TTL
//!     store.set("user:123", "John Doe", 60);
//!
//!     // A TTL of zero (or any non-positive value) never expires
//!     store.set("motd", "hello", 0);
//!
//!     // Retrieve the value
//!     if let Some(value) = store.get("user:123") {
//!         println!("User: {}", value);
//!     }
//!
//!     // Stop the background reclaimer and wait for it to finish
//!     store.shutdown().await;
//! }
//! ```

mod config;
mod entry;
mod reclaim;
mod store;

pub use config::StoreConfig;
pub use entry::Entry;
pub use store::Store;
