use std::time::{Duration, Instant};

/// Cache slot with lazy expiry.
///
/// Staleness is computed on read; entries are never evicted by a
/// background sweep, so an expired value stays around as the last
/// known one until the next successful fetch overwrites it.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    value: T,
    stored_at: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
        }
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}
