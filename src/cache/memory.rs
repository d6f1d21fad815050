//! In-memory response cache with TTL expiry and LRU eviction.
//!
//! Shared by every concurrent request handler behind a single coarse lock.
//! There is no per-key mutual exclusion: two requests that miss the same key
//! concurrently will both run the downstream handler and both write the
//! entry. Last write wins; the payloads are read-identical so the race costs
//! duplicated work, not correctness.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use chrono::DateTime;
use tracing::debug;

use crate::cache::{CachedResponse, ResponseCacheStats};

struct CacheEntry {
    body: Bytes,
    content_type: Option<String>,
    /// Unix timestamp when the entry was created; expiry is measured from
    /// here regardless of later accesses.
    created_at: u64,
    /// Unix timestamp of the last access, for LRU ordering
    accessed_at: u64,
    hit_count: u32,
}

/// Bounded TTL + LRU cache of serialized HTTP response bodies.
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl_secs: u64,
    max_entries: usize,
}

impl ResponseCache {
    /// Create a cache with the given TTL and capacity.
    ///
    /// `max_entries` is clamped to a minimum of 1 so the eviction loop
    /// cannot spin forever.
    pub fn new(ttl_secs: u64, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl_secs,
            max_entries: max_entries.max(1),
        }
    }

    /// Look up a cached response. Returns `None` if the key is absent or the
    /// entry has outlived its TTL; expired entries are removed on the spot.
    pub fn get(&self, key: &str) -> Option<CachedResponse> {
        let now = Self::now_secs();
        let mut entries = self.lock();

        let expired = entries
            .get(key)
            .map(|e| now.saturating_sub(e.created_at) > self.ttl_secs)?;
        if expired {
            debug!(key = %key, "Cache entry expired, removing");
            entries.remove(key);
            return None;
        }

        let entry = entries.get_mut(key)?;
        entry.accessed_at = now;
        entry.hit_count = entry.hit_count.saturating_add(1);
        Some(CachedResponse {
            body: entry.body.clone(),
            content_type: entry.content_type.clone(),
        })
    }

    /// Store a response body under a request key.
    ///
    /// Expired entries are evicted first; if the cache is still at capacity,
    /// least-recently-used entries are evicted until the insert fits.
    pub fn insert(&self, key: String, body: Bytes, content_type: Option<String>) {
        let now = Self::now_secs();
        let mut entries = self.lock();

        let ttl = self.ttl_secs;
        entries.retain(|_, e| now.saturating_sub(e.created_at) <= ttl);

        while entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let lru_key = entries
                .iter()
                .min_by_key(|(_, e)| e.accessed_at)
                .map(|(k, _)| k.clone());
            match lru_key {
                Some(k) => {
                    debug!(key = %k, "Evicting LRU cache entry");
                    entries.remove(&k);
                }
                None => break,
            }
        }

        entries.insert(
            key,
            CacheEntry {
                body,
                content_type,
                created_at: now,
                accessed_at: now,
                hit_count: 0,
            },
        );
    }

    /// Aggregate statistics over the current entries.
    pub fn stats(&self) -> ResponseCacheStats {
        let entries = self.lock();
        let total_hits = entries.values().map(|e| u64::from(e.hit_count)).sum();
        let oldest_entry = entries
            .values()
            .map(|e| e.created_at)
            .min()
            .and_then(|ts| DateTime::from_timestamp(ts as i64, 0));
        let newest_entry = entries
            .values()
            .map(|e| e.created_at)
            .max()
            .and_then(|ts| DateTime::from_timestamp(ts as i64, 0));
        ResponseCacheStats {
            total_entries: entries.len(),
            total_hits,
            oldest_entry,
            newest_entry,
        }
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // -- private helpers ---------------------------------------------------

    /// A poisoned lock degrades to serving whatever state is there rather
    /// than failing the request.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn now_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
