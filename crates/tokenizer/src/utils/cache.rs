//! Word cache for repeated pieces.
//!
//! Natural text repeats the same words constantly; caching the tokens of
//! recently seen pieces skips the merge loop for them entirely.

use ahash::AHashMap;
use runebpe_core::Result;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Entry {
    tokens: Vec<String>,
    /// Last-use stamp, key into `order`
    stamp: u64,
}

/// LRU cache mapping a piece of text to its tokens.
///
/// When the cache exceeds capacity, the least recently used entry is
/// evicted. A capacity of zero disables caching. Hits and evictions are
/// O(log n) in the number of entries.
#[derive(Debug, Clone)]
pub struct EncodingCache {
    /// The cache storing piece -> tokens
    cache: AHashMap<String, Entry>,
    /// Maximum number of entries in the cache
    capacity: usize,
    /// Last-use stamp -> piece, oldest first
    order: BTreeMap<u64, String>,
    /// Next stamp to hand out
    clock: u64,
    hits: u64,
    misses: u64,
}

impl EncodingCache {
    /// Create a new encoding cache with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: AHashMap::with_capacity(capacity),
            capacity,
            order: BTreeMap::new(),
            clock: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Create a new encoding cache with default capacity (1000).
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    /// Get cached tokens for `text` or compute them with `encoder`.
    ///
    /// Errors from `encoder` are returned and nothing is cached.
    pub fn get_or_encode<F>(&mut self, text: &str, encoder: F) -> Result<Vec<String>>
    where
        F: FnOnce(&str) -> Result<Vec<String>>,
    {
        if self.capacity == 0 {
            return encoder(text);
        }

        if let Some(entry) = self.cache.get_mut(text) {
            self.hits += 1;
            let stamp = self.clock;
            self.clock += 1;
            if let Some(key) = self.order.remove(&entry.stamp) {
                self.order.insert(stamp, key);
            }
            entry.stamp = stamp;
            return Ok(entry.tokens.clone());
        }

        self.misses += 1;
        let encoded = encoder(text)?;
        self.insert(text.to_string(), encoded.clone());
        Ok(encoded)
    }

    fn insert(&mut self, key: String, tokens: Vec<String>) {
        while self.cache.len() >= self.capacity {
            match self.order.pop_first() {
                Some((_, oldest)) => {
                    self.cache.remove(&oldest);
                }
                None => break,
            }
        }
        let stamp = self.clock;
        self.clock += 1;
        self.order.insert(stamp, key.clone());
        self.cache.insert(key, Entry { tokens, stamp });
    }

    /// Clear all entries from the cache.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.order.clear();
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Get the cache capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether `text` is currently cached.
    pub fn contains(&self, text: &str) -> bool {
        self.cache.contains_key(text)
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let lookups = self.hits + self.misses;
        CacheStats {
            entries: self.cache.len(),
            capacity: self.capacity,
            hit_rate: (lookups > 0).then(|| self.hits as f64 / lookups as f64),
        }
    }
}

impl Default for EncodingCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Current number of entries
    pub entries: usize,
    /// Maximum capacity
    pub capacity: usize,
    /// Fraction of lookups served from the cache (None before any lookup)
    pub hit_rate: Option<f64>,
}
