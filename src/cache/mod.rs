pub mod memory;
pub mod middleware;

use bytes::Bytes;
use chrono::{DateTime, Utc};

pub use memory::ResponseCache;
pub use middleware::respond_from_cache;

/// Entries expire this many seconds after insertion, independent of access.
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Bounded entry count; least-recently-used unexpired entries are evicted
/// when an insert would exceed it.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// A cached response payload: the fully buffered body plus the content type
/// it was originally served with.
///
/// Bodies are always materialized to bytes before caching. Handing out a
/// stream handle instead would let the first reader consume it and leave
/// every later hit with a truncated or empty body.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub body: Bytes,
    pub content_type: Option<String>,
}

/// Aggregate cache statistics.
#[derive(Debug, Clone)]
pub struct ResponseCacheStats {
    /// Number of entries currently in the cache
    pub total_entries: usize,
    /// Cumulative number of hits across all entries
    pub total_hits: u64,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}
