//! In-memory parse cache: bounded LRU with per-entry TTL, keyed by an
//! FNV-1a hash of the input text and destination.

use crate::types::ParseResult;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

const DEFAULT_CAPACITY: usize = 100;
const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// 64-bit FNV-1a over content and destination, separated by a zero byte so
/// `("ab", "c")` and `("a", "bc")` hash differently.
pub fn cache_key(content: &str, destination: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET_BASIS;
    for byte in content.bytes().chain([0u8]).chain(destination.bytes()) {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

struct Entry {
    result: ParseResult,
    inserted: Instant,
    last_used: Instant,
}

/// Bounded cache of successful parse results.
///
/// Not internally synchronized; the service wraps it in a mutex.
pub struct TimelineCache {
    entries: HashMap<u64, Entry>,
    capacity: usize,
    ttl: Duration,
}

impl std::fmt::Debug for TimelineCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

impl Default for TimelineCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl TimelineCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// Look up a cached result, refreshing its recency. Expired entries are
    /// removed on access.
    pub fn get(&mut self, content: &str, destination: &str) -> Option<ParseResult> {
        let key = cache_key(content, destination);
        let now = Instant::now();
        match self.entries.get_mut(&key) {
            Some(entry) if now.duration_since(entry.inserted) < self.ttl => {
                entry.last_used = now;
                debug!(target: "timeline::cache", key, "cache hit");
                Some(entry.result.clone())
            }
            Some(_) => {
                self.entries.remove(&key);
                debug!(target: "timeline::cache", key, "cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Insert a result, evicting the least-recently-used entry at capacity.
    pub fn insert(&mut self, content: &str, destination: &str, result: ParseResult) {
        let key = cache_key(content, destination);
        if self.entries.len() >= self.capacity && !self.entries.contains_key(&key) {
            if let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| *key)
            {
                self.entries.remove(&oldest);
                debug!(target: "timeline::cache", key = oldest, "evicted LRU entry");
            }
        }
        let now = Instant::now();
        self.entries.insert(
            key,
            Entry {
                result,
                inserted: now,
                last_used: now,
            },
        );
    }

    /// Drop every expired entry.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.inserted) < self.ttl);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
