use std::time::Duration;

/// Configuration for the store's background reclaimer task
///
/// # Example
///
/// ```rust
/// use stash_core::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_sweep_interval(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Interval between reclamation sweeps (default: 30 seconds)
    pub sweep_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(30),
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sweep interval
    ///
    /// This determines how often the background reclaimer runs to remove
    /// expired entries. Shorter intervals bound the memory held by expired
    /// keys more tightly; longer intervals reduce lock contention.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stash_core::StoreConfig;
    /// use std::time::Duration;
    ///
    /// // Sweep every 10 seconds
    /// let config = StoreConfig::default()
    ///     .with_sweep_interval(Duration::from_secs(10));
    /// ```
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}
