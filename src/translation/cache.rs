/*!
 * Translation caching functionality.
 *
 * One cache lives for the processing of one plugin. It avoids asking the
 * provider twice for the same string of the same record type.
 */

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::RwLock;
use log::debug;

/// Cache key combining record type and source text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    /// Record type the text belongs to (e.g. `DIAL FULL`)
    record_type: String,

    /// Source text to translate
    source_text: String,
}

impl CacheKey {
    /// Create a new cache key
    fn new(record_type: &str, source_text: &str) -> Self {
        Self {
            record_type: record_type.to_string(),
            source_text: source_text.to_string(),
        }
    }
}

/// Translation cache for storing and retrieving translations
#[derive(Debug, Default)]
pub struct TranslationCache {
    /// Internal cache storage
    entries: RwLock<HashMap<CacheKey, String>>,

    /// Cache hit counter
    hits: AtomicUsize,

    /// Cache miss counter
    misses: AtomicUsize,
}

impl TranslationCache {
    /// Create a new, empty translation cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a translation from the cache
    pub fn get(&self, record_type: &str, source_text: &str) -> Option<String> {
        let key = CacheKey::new(record_type, source_text);
        let found = self.entries.read().get(&key).cloned();

        match &found {
            Some(_) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit for '{}' ({})", truncate_text(source_text, 30), record_type);
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
            }
        }

        found
    }

    /// Store a translation in the cache, replacing any previous entry for the key
    pub fn set(&self, record_type: &str, source_text: &str, translation: &str) {
        let key = CacheKey::new(record_type, source_text);
        self.entries.write().insert(key, translation.to_string());
    }

    /// Get cache statistics as (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Truncate text to a maximum number of characters with ellipsis
fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{}...", head)
    }
}
