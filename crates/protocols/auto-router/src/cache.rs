//! Quote cache
//!
//! Coalesces identical quote requests: concurrent callers with the same key
//! share one computation, and its result is reused until the entry expires.
//! Failed computations are not stored, so the next caller retries.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::OnceCell;

struct CacheSlot<V> {
    created_at: Instant,
    ttl: Duration,
    cell: Arc<OnceCell<V>>,
}

impl<V> CacheSlot<V> {
    fn new(ttl: Duration) -> Self {
        Self {
            created_at: Instant::now(),
            ttl,
            cell: Arc::new(OnceCell::new()),
        }
    }

    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// TTL cache with per-key request coalescing.
pub struct QuoteCache<K, V> {
    entries: DashMap<K, CacheSlot<V>>,
    max_entries: usize,
}

impl<K, V> QuoteCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    /// Return the cached value for `key`, or run `producer` once for all
    /// concurrent callers of the same key.
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, ttl: Duration, producer: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if self.len() >= self.max_entries && !self.entries.contains_key(&key) {
            self.purge_expired();
            // Still full: serve the miss without storing it
            if self.len() >= self.max_entries {
                tracing::debug!(max_entries = self.max_entries, "Quote cache full");
                return producer().await;
            }
        }

        // The map guard must be released before awaiting
        let cell = {
            let mut slot = self
                .entries
                .entry(key)
                .or_insert_with(|| CacheSlot::new(ttl));
            if slot.is_expired() {
                *slot = CacheSlot::new(ttl);
            }
            Arc::clone(&slot.cell)
        };

        if let Some(value) = cell.get() {
            tracing::trace!("Quote cache hit");
            return Ok(value.clone());
        }
        let value = cell.get_or_try_init(producer).await?;
        Ok(value.clone())
    }

    /// Drop expired entries, and failed or never-finished ones past their TTL
    pub fn purge_expired(&self) {
        if self.is_empty() {
            return;
        }
        let before = self.entries.len();
        self.entries.retain(|_, slot| !slot.is_expired());
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, remaining = self.entries.len(), "Purged quote cache");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
