//! Client configuration options.

/// Options for configuring the stash client connection.
///
/// # Example
///
/// ```rust
/// use stash_client::StashClientOptions;
///
/// let options = StashClientOptions::new("http://localhost:50051");
/// ```
#[derive(Clone, Debug)]
pub struct StashClientOptions {
    /// The server URL (e.g., "http://localhost:50051")
    pub url: String,
}

impl StashClientOptions {
    /// Create new options with the given server URL.
    ///
    /// # Arguments
    /// * `url` - The stash server URL (e.g., "http://localhost:50051")
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Create options from environment variables.
    ///
    /// Reads:
    /// - `STASH_SERVER_URL` - Server URL (defaults to "http://127.0.0.1:50051")
    pub fn from_env() -> Self {
        let url = std::env::var("STASH_SERVER_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:50051".to_string());

        Self { url }
    }
}

impl Default for StashClientOptions {
    fn default() -> Self {
        Self::new("http://127.0.0.1:50051")
    }
}
