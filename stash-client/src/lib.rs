//! # Stash Client
//!
//! A high-level Rust client for the stash in-memory key-value service.
//!
//! This crate provides a simple, ergonomic API for interacting with a stash
//! server, hiding the underlying gRPC plumbing.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stash_client::StashClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), stash_client::Error> {
//!     // Connect to the server
//!     let client = StashClient::connect("http://localhost:50051").await?;
//!
//!     // Store a value with a 5-minute TTL
//!     client.set("my-key", "my-value", Some(300)).await?;
//!
//!     // Store a value that never expires
//!     client.set("permanent", "value", None).await?;
//!
//!     // Retrieve the value; absent and expired keys both yield None
//!     if let Some(value) = client.get("my-key").await? {
//!         println!("Got: {}", value);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## JSON Serialization (requires `json` feature)
//!
//! ```rust,no_run
//! use stash_client::StashClient;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct User {
//!     name: String,
//!     age: u32,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), stash_client::Error> {
//!     let client = StashClient::connect("http://localhost:50051").await?;
//!
//!     let user = User { name: "Alice".into(), age: 30 };
//!     client.set_json("user:1", &user, Some(3600)).await?;
//!
//!     let retrieved: Option<User> = client.get_json("user:1").await?;
//!     Ok(())
//! }
//! ```

mod error;
mod options;

pub use error::Error;
pub use options::StashClientOptions;

use std::sync::Arc;
use tokio::sync::RwLock;
use tonic::transport::Channel;

use stash_proto::stash_client::StashClient as GrpcClient;
use stash_proto::{GetRequest, SetRequest};

/// A high-level client for the stash key-value service.
///
/// This client handles connection management and provides a simple async
/// API for the two store operations.
///
/// The client is thread-safe and can be cloned cheaply (it uses internal Arc).
#[derive(Clone)]
pub struct StashClient {
    inner: Arc<RwLock<GrpcClient<Channel>>>,
}

impl StashClient {
    /// Connect to a stash server.
    ///
    /// # Arguments
    /// * `url` - The server URL (e.g., "http://localhost:50051")
    ///
    /// # Example
    /// ```rust,no_run
    /// # use stash_client::StashClient;
    /// # async fn example() -> Result<(), stash_client::Error> {
    /// let client = StashClient::connect("http://localhost:50051").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self, Error> {
        Self::with_options(StashClientOptions::new(url)).await
    }

    /// Connect to a stash server with custom options.
    ///
    /// # Arguments
    /// * `options` - Connection options
    ///
    /// # Example
    /// ```rust,no_run
    /// # use stash_client::{StashClient, StashClientOptions};
    /// # async fn example() -> Result<(), stash_client::Error> {
    /// let options = StashClientOptions::from_env();
    /// let client = StashClient::with_options(options).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn with_options(options: StashClientOptions) -> Result<Self, Error> {
        let channel = Channel::from_shared(options.url.clone())
            .map_err(|e| Error::Connection(e.to_string()))?
            .connect()
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let client = GrpcClient::new(channel);

        Ok(Self {
            inner: Arc::new(RwLock::new(client)),
        })
    }

    /// Store a value in the store.
    ///
    /// # Arguments
    /// * `key` - The key
    /// * `value` - The value to store
    /// * `ttl_seconds` - Optional time-to-live in seconds. `None` (or any
    ///   non-positive value) means the entry never expires.
    ///
    /// # Example
    /// ```rust,no_run
    /// # use stash_client::StashClient;
    /// # async fn example() -> Result<(), stash_client::Error> {
    /// # let client = StashClient::connect("http://localhost:50051").await?;
    /// // Store with a 5-minute TTL
    /// client.set("key", "value", Some(300)).await?;
    ///
    /// // Store without expiration
    /// client.set("permanent", "value", None).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl_seconds: Option<i64>,
    ) -> Result<(), Error> {
        let mut client = self.inner.write().await;
        client
            .set(SetRequest {
                key: key.into(),
                value: value.into(),
                ttl_seconds: ttl_seconds.unwrap_or(0),
            })
            .await?;
        Ok(())
    }

    /// Retrieve a value from the store.
    ///
    /// Returns `None` if the key doesn't exist or has expired; the two
    /// cases are indistinguishable.
    ///
    /// # Arguments
    /// * `key` - The key to look up
    ///
    /// # Example
    /// ```rust,no_run
    /// # use stash_client::StashClient;
    /// # async fn example() -> Result<(), stash_client::Error> {
    /// # let client = StashClient::connect("http://localhost:50051").await?;
    /// if let Some(value) = client.get("my-key").await? {
    ///     println!("Found: {}", value);
    /// } else {
    ///     println!("Key not found");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get(&self, key: impl Into<String>) -> Result<Option<String>, Error> {
        let mut client = self.inner.write().await;
        let response = client.get(GetRequest { key: key.into() }).await?;

        Ok(response.into_inner().value)
    }
}

// JSON extension methods (only available with "json" feature)
#[cfg(feature = "json")]
impl StashClient {
    /// Store a JSON-serializable value.
    ///
    /// # Arguments
    /// * `key` - The key
    /// * `value` - The value to serialize and store
    /// * `ttl_seconds` - Optional time-to-live in seconds
    ///
    /// # Example
    /// ```rust,no_run
    /// # use stash_client::StashClient;
    /// # use serde::{Serialize, Deserialize};
    /// # #[derive(Serialize)]
    /// # struct User { name: String }
    /// # async fn example() -> Result<(), stash_client::Error> {
    /// # let client = StashClient::connect("http://localhost:50051").await?;
    /// let user = User { name: "Alice".into() };
    /// client.set_json("user:1", &user, Some(3600)).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn set_json<T: serde::Serialize>(
        &self,
        key: impl Into<String>,
        value: &T,
        ttl_seconds: Option<i64>,
    ) -> Result<(), Error> {
        let json = serde_json::to_string(value).map_err(Error::Serialization)?;
        self.set(key, json, ttl_seconds).await
    }

    /// Retrieve and deserialize a JSON value.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    ///
    /// # Arguments
    /// * `key` - The key to look up
    ///
    /// # Example
    /// ```rust,no_run
    /// # use stash_client::StashClient;
    /// # use serde::{Serialize, Deserialize};
    /// # #[derive(Deserialize)]
    /// # struct User { name: String }
    /// # async fn example() -> Result<(), stash_client::Error> {
    /// # let client = StashClient::connect("http://localhost:50051").await?;
    /// let user: Option<User> = client.get_json("user:1").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        key: impl Into<String>,
    ) -> Result<Option<T>, Error> {
        match self.get(key).await? {
            Some(json) => {
                let value = serde_json::from_str(&json).map_err(Error::Deserialization)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}
