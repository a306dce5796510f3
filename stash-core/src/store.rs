use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::StoreConfig;
use crate::entry::Entry;
use crate::reclaim::Reclaimer;

/// TTLs are capped at ~100 years to keep `Instant` arithmetic from
/// overflowing on absurd inputs.
const MAX_TTL_SECONDS: i64 = 100 * 365 * 24 * 60 * 60;

/// Internal shared state for the store
pub(crate) struct StoreInner {
    data: DashMap<String, Entry>,
    /// Sender to signal shutdown to the reclaimer task
    shutdown_tx: watch::Sender<bool>,
    /// Handle of the reclaimer task, taken by `shutdown` to await it
    reclaimer: Mutex<Option<JoinHandle<()>>>,
}

impl StoreInner {
    /// Removes every expired entry in one pass over the map
    ///
    /// Returns the number of entries removed. Exclusive access is only held
    /// per shard and only for the duration of the scan.
    pub(crate) fn sweep(&self) -> usize {
        let mut removed = 0;
        self.data.retain(|_, entry| {
            if entry.is_expired() {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        // Signal the reclaimer to stop when the last handle is dropped
        let _ = self.shutdown_tx.send(true);
    }
}

/// Thread-safe in-memory key-value store with per-key TTL expiration
///
/// Uses `DashMap` for sharded concurrent access: reads proceed in parallel,
/// and writes only exclude access to the shard holding the key being
/// written. The value and its expiration live in a single [`Entry`], so a
/// reader can never observe a half-written pair.
///
/// Expired entries are removed lazily when a `get` discovers them, and
/// eagerly by a background reclaimer task that each store spawns on
/// construction. The reclaimer is signalled to stop when the last handle is
/// dropped; call [`Store::shutdown`] to also wait for it to finish.
///
/// # Example
///
/// ```rust,no_run
/// use stash_core::{Store, StoreConfig};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     // Default config sweeps every 30 seconds
///     let store = Store::new();
///
///     // Or with a custom sweep interval
///     let config = StoreConfig::default()
///         .with_sweep_interval(Duration::from_secs(10));
///     let store = Store::with_config(config);
///
///     store.set("key", "value", 300); // 5 minute TTL
///     store.set("pinned", "value", 0); // never expires
/// }
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Creates a new store with default configuration
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The store
    /// requires a runtime to spawn its background reclaimer task.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a new store with custom configuration
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The store
    /// requires a runtime to spawn its background reclaimer task.
    pub fn with_config(config: StoreConfig) -> Self {
        // Verify that a Tokio runtime is available before proceeding.
        // This provides a clear error message instead of a cryptic panic
        // from tokio::spawn.
        if tokio::runtime::Handle::try_current().is_err() {
            panic!(
                "stash_core::Store requires a Tokio runtime. \
                 Ensure you are calling Store::new() or Store::with_config() \
                 from within a #[tokio::main] or #[tokio::test] context, \
                 or from code running on a Tokio runtime."
            );
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let inner = Arc::new(StoreInner {
            data: DashMap::new(),
            shutdown_tx,
            reclaimer: Mutex::new(None),
        });

        // The reclaimer gets a weak reference so the task never keeps the
        // store alive on its own.
        let handle = Reclaimer::spawn(
            Arc::downgrade(&inner),
            config.sweep_interval,
            shutdown_rx,
        );
        if let Ok(mut slot) = inner.reclaimer.lock() {
            *slot = Some(handle);
        }

        Self { inner }
    }

    /// Stores a value under the given key with a TTL in seconds
    ///
    /// Any existing entry for the key is unconditionally overwritten; the
    /// new expiration replaces the old one, so an overwrite always clears a
    /// prior TTL.
    ///
    /// # TTL Semantics
    ///
    /// - `ttl_seconds > 0`: the entry expires `ttl_seconds` from now
    ///   (capped at ~100 years).
    /// - `ttl_seconds <= 0`: the entry never expires.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>, ttl_seconds: i64) {
        let expires_at = if ttl_seconds > 0 {
            let safe_ttl = ttl_seconds.min(MAX_TTL_SECONDS) as u64;
            Some(Instant::now() + Duration::from_secs(safe_ttl))
        } else {
            None
        };

        let value: String = value.into();
        let entry = Entry::new(Arc::from(value), expires_at);
        self.inner.data.insert(key.into(), entry);
    }

    /// Retrieves the value for a key
    ///
    /// Returns `None` if the key is absent or its entry has expired; the
    /// two cases are indistinguishable to the caller. An expired entry
    /// discovered here is removed before returning, so a later lookup does
    /// not find it again.
    pub fn get(&self, key: &str) -> Option<Arc<str>> {
        let entry = self.inner.data.get(key)?;

        if entry.value().is_expired() {
            // Drop the read reference before removing
            drop(entry);
            // remove_if re-checks expiry under the write lock, so a racing
            // overwrite that installed a fresh entry is never removed, and
            // concurrent discovery of the same expired key is idempotent.
            self.inner.data.remove_if(key, |_, v| v.is_expired());
            return None;
        }

        Some(entry.value().value_shared())
    }

    /// Removes all expired entries and returns the number removed
    ///
    /// This is the same pass the background reclaimer performs on its
    /// interval; a sweep that finds nothing to remove is a no-op.
    pub fn sweep(&self) -> usize {
        self.inner.sweep()
    }

    /// Returns the number of physical entries in the store
    ///
    /// Entries that have expired but not yet been reclaimed are counted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.data.len()
    }

    /// Returns `true` if the store holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }

    /// Signals the reclaimer task to stop and waits for it to finish
    ///
    /// Stored entries are untouched and the store remains usable; only
    /// future sweeps stop running. Dropping the last `Store` handle sends
    /// the same signal without waiting.
    pub async fn shutdown(&self) {
        let _ = self.inner.shutdown_tx.send(true);
        let handle = match self.inner.reclaimer.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Stores a value that is already expired (for testing purposes)
    #[cfg(test)]
    fn set_expired(&self, key: impl Into<String>, value: impl Into<String>) {
        let expires_at = Instant::now() - Duration::from_secs(1);
        let value: String = value.into();
        self.inner
            .data
            .insert(key.into(), Entry::new(Arc::from(value), Some(expires_at)));
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    /// Helper to create a store within a tokio runtime for tests
    fn create_test_store() -> Store {
        // Long interval so the background reclaimer never interferes
        create_test_store_with_config(
            StoreConfig::default().with_sweep_interval(Duration::from_secs(3600)),
        )
    }

    fn create_test_store_with_config(config: StoreConfig) -> Store {
        // Create a runtime for the background task
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();

        // Keep the runtime alive by leaking it (fine for tests)
        let rt = Box::leak(Box::new(rt));
        let _guard = rt.enter();

        Store::with_config(config)
    }

    #[test]
    fn test_set_and_get() {
        let store = create_test_store();
        store.set("key1", "value1", 60);

        assert_eq!(store.get("key1").as_deref(), Some("value1"));
    }

    #[test]
    fn test_get_nonexistent_key() {
        let store = create_test_store();
        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_overwrite_key() {
        let store = create_test_store();
        store.set("key1", "value1", 60);
        store.set("key1", "value2", 60);

        assert_eq!(store.get("key1").as_deref(), Some("value2"));
    }

    #[test]
    fn test_zero_ttl_never_expires() {
        let store = create_test_store();
        store.set("key1", "value1", 0);

        thread::sleep(Duration::from_millis(50));

        assert_eq!(store.get("key1").as_deref(), Some("value1"));
    }

    #[test]
    fn test_negative_ttl_never_expires() {
        let store = create_test_store();
        store.set("key1", "value1", -5);

        thread::sleep(Duration::from_millis(50));

        assert_eq!(store.get("key1").as_deref(), Some("value1"));
    }

    #[test]
    fn test_ttl_entry_expires() {
        let store = create_test_store();
        store.set("key1", "value1", 1);

        // Immediately visible
        assert_eq!(store.get("key1").as_deref(), Some("value1"));

        thread::sleep(Duration::from_millis(1100));

        // Expired: indistinguishable from a missing key
        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_overwrite_clears_ttl() {
        let store = create_test_store();
        store.set("key1", "a", 1);
        store.set("key1", "b", 0);

        thread::sleep(Duration::from_millis(1100));

        // The overwrite replaced the expiration along with the value
        assert_eq!(store.get("key1").as_deref(), Some("b"));
    }

    #[test]
    fn test_expired_entry_returns_none() {
        let store = create_test_store();
        store.set_expired("key1", "value1");

        assert_eq!(store.get("key1"), None);
    }

    #[test]
    fn test_lazy_removal_on_get() {
        let store = create_test_store();
        store.set_expired("key1", "value1");

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("key1"), None);

        // The read physically removed the entry
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_sweep_removes_expired() {
        let store = create_test_store();

        store.set_expired("expired1", "value1");
        store.set_expired("expired2", "value2");
        store.set("valid", "value3", 60);

        let removed = store.sweep();
        assert_eq!(removed, 2);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("valid").as_deref(), Some("value3"));
    }

    #[test]
    fn test_sweep_empty_store_is_noop() {
        let store = create_test_store();
        assert_eq!(store.sweep(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_sweep_keeps_never_expiring_entries() {
        let store = create_test_store();
        store.set("pinned", "value", 0);
        store.set_expired("gone", "value");

        assert_eq!(store.sweep(), 1);
        assert_eq!(store.get("pinned").as_deref(), Some("value"));
    }

    #[test]
    fn test_extreme_ttl_does_not_panic() {
        let store = create_test_store();
        // TTL is capped internally
        store.set("key1", "value1", i64::MAX);

        assert_eq!(store.get("key1").as_deref(), Some("value1"));
    }

    #[test]
    fn test_len_and_is_empty() {
        let store = create_test_store();

        assert!(store.is_empty());
        assert_eq!(store.len(), 0);

        store.set("key1", "value1", 60);

        assert!(!store.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_concurrent_writes() {
        let store = Arc::new(create_test_store());
        let mut handles = vec![];

        // Spawn 10 threads, each writing 100 keys
        for thread_id in 0..10 {
            let store = Arc::clone(&store);
            let handle = thread::spawn(move || {
                for i in 0..100 {
                    let key = format!("thread{}:key{}", thread_id, i);
                    let value = format!("value{}", i);
                    store.set(key, value, 60);
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        // Verify all 1000 keys were written
        assert_eq!(store.len(), 1000);
    }

    #[test]
    fn test_concurrent_reads_and_writes() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let store = Arc::new(create_test_store());

        // Pre-populate with some data
        for i in 0..100 {
            store.set(format!("key{}", i), format!("value{}", i), 60);
        }

        let successful_reads = Arc::new(AtomicUsize::new(0));
        let mut handles = vec![];

        // Spawn reader threads
        for _ in 0..5 {
            let store = Arc::clone(&store);
            let successful_reads = Arc::clone(&successful_reads);
            let handle = thread::spawn(move || {
                for i in 0..100 {
                    if store.get(&format!("key{}", i)).is_some() {
                        successful_reads.fetch_add(1, Ordering::SeqCst);
                    }
                }
            });
            handles.push(handle);
        }

        // Spawn writer threads (writing to different keys)
        for thread_id in 0..5 {
            let store = Arc::clone(&store);
            let handle = thread::spawn(move || {
                for i in 0..100 {
                    let key = format!("new_thread{}:key{}", thread_id, i);
                    store.set(key, "new_value", 60);
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        // All reads should have succeeded (original 100 keys still exist)
        assert_eq!(successful_reads.load(Ordering::SeqCst), 500); // 5 threads * 100 reads

        // Should have original 100 + 500 new keys
        assert_eq!(store.len(), 600);
    }

    #[test]
    fn test_concurrent_writes_to_same_key() {
        let store = Arc::new(create_test_store());
        let mut handles = vec![];

        // Spawn 10 threads, all writing to the same key
        for thread_id in 0..10 {
            let store = Arc::clone(&store);
            let handle = thread::spawn(move || {
                for i in 0..100 {
                    let value = format!("thread{}:iteration{}", thread_id, i);
                    store.set("contested_key", value, 60);
                }
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        // Should only have 1 key (all writes went to the same key)
        assert_eq!(store.len(), 1);

        // The winning value is whole: one thread's write, never a mix
        let value = store.get("contested_key").expect("key must exist");
        assert!(value.starts_with("thread"));
        assert!(value.contains(":iteration"));
    }

    #[test]
    fn test_concurrent_expiry_discovery_is_idempotent() {
        let store = Arc::new(create_test_store());
        store.set_expired("stale", "value");

        let mut handles = vec![];
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || store.get("stale")));
        }

        // Every concurrent reader sees not-found, no matter who removes
        for handle in handles {
            assert_eq!(handle.join().expect("Thread panicked"), None);
        }

        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_concurrent_sweep_with_operations() {
        let store = Arc::new(create_test_store());

        // Pre-populate with expired and live data
        for i in 0..50 {
            store.set_expired(format!("expiring{}", i), "value");
            store.set(format!("persistent{}", i), "value", 60);
        }

        let mut handles = vec![];

        // Sweep concurrently with readers and a writer
        let store_sweep = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            let _ = store_sweep.sweep();
        }));

        for _ in 0..3 {
            let store = Arc::clone(&store);
            handles.push(thread::spawn(move || {
                for i in 0..50 {
                    // Expired keys report not-found whether or not the
                    // sweep got there first
                    let _ = store.get(&format!("expiring{}", i));
                    let _ = store.get(&format!("persistent{}", i));
                }
            }));
        }

        let store_writer = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..50 {
                store_writer.set(format!("new{}", i), "value", 60);
            }
        }));

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        // Expired keys are gone, persistent + new remain
        assert_eq!(store.len(), 100);
        for i in 0..50 {
            assert!(store.get(&format!("persistent{}", i)).is_some());
            assert!(store.get(&format!("new{}", i)).is_some());
        }
    }

    #[tokio::test]
    async fn test_background_reclaimer_runs() {
        // Create a store with a very short sweep interval
        let config = StoreConfig::default().with_sweep_interval(Duration::from_millis(50));
        let store = Store::with_config(config);

        store.set_expired("expire1", "value1");
        store.set_expired("expire2", "value2");
        store.set("keep", "value3", 60);

        // Initially all 3 entries exist (even if expired)
        assert_eq!(store.len(), 3);

        // Wait for the background sweep to run (interval + some buffer)
        tokio::time::sleep(Duration::from_millis(100)).await;

        // The reclaimer removed the expired entries
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("keep").as_deref(), Some("value3"));
    }

    #[tokio::test]
    async fn test_shutdown_stops_reclaimer() {
        let config = StoreConfig::default().with_sweep_interval(Duration::from_millis(50));
        let store = Store::with_config(config);

        // Waits for the task to finish, not just for the signal to be sent
        store.shutdown().await;

        store.set_expired("stale", "value");
        tokio::time::sleep(Duration::from_millis(150)).await;

        // No sweep ran after shutdown; the entry is only reclaimed lazily
        assert_eq!(store.len(), 1);

        // The store itself remains usable
        store.set("key1", "value1", 60);
        assert_eq!(store.get("key1").as_deref(), Some("value1"));
        assert_eq!(store.get("stale"), None);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let store = Store::new();
        store.shutdown().await;
        store.shutdown().await;
    }

    #[tokio::test]
    async fn test_store_clone_shares_data() {
        let store1 = Store::new();
        let store2 = store1.clone();

        store1.set("key1", "value1", 60);

        // Both handles see the same data
        assert_eq!(store2.get("key1").as_deref(), Some("value1"));

        store2.set("key2", "value2", 60);
        assert_eq!(store1.get("key2").as_deref(), Some("value2"));
    }

    #[tokio::test]
    async fn test_multiple_stores_independent_reclaim() {
        let store1 =
            Store::with_config(StoreConfig::default().with_sweep_interval(Duration::from_millis(50)));
        let store2 =
            Store::with_config(StoreConfig::default().with_sweep_interval(Duration::from_secs(3600)));

        store1.set_expired("expire", "value");
        store2.set("keep", "value", 60);

        // Wait for store1's sweep to run
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(store1.len(), 0);

        // store2 is untouched (independent reclaimer)
        assert_eq!(store2.len(), 1);
        assert_eq!(store2.get("keep").as_deref(), Some("value"));
    }
}
