use std::sync::Arc;
use std::time::Instant;

/// A stored value together with its expiration time
///
/// `expires_at` of `None` means the entry never expires. The value and the
/// expiration always travel together so readers can never observe one
/// without the other.
#[derive(Debug, Clone)]
pub struct Entry {
    value: Arc<str>,
    expires_at: Option<Instant>,
}

impl Entry {
    /// Creates a new entry with the given value and optional expiration time
    pub fn new(value: Arc<str>, expires_at: Option<Instant>) -> Self {
        Self { value, expires_at }
    }

    /// Returns the stored value as a string slice
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns a shared reference to the stored value (zero-cost clone)
    pub fn value_shared(&self) -> Arc<str> {
        Arc::clone(&self.value)
    }

    /// Returns the expiration time, if any
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Checks whether this entry has expired
    ///
    /// An entry whose expiration is at or before the current instant is
    /// expired; an entry with no expiration never is.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Instant::now() >= expires_at,
            None => false,
        }
    }
}
