/*!
 * Memo of finished translations.
 *
 * Results are cached per (source text, target language) for a configurable
 * time-to-live so repeated strings inside one run, or across runs of a
 * long-lived process, never cost a second network call. Expired entries are
 * evicted when they are read.
 */

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source_text: String,
    target_language: String,
}

impl CacheKey {
    fn new(source_text: &str, target_language: &str) -> Self {
        Self {
            source_text: source_text.to_string(),
            target_language: target_language.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    translation: String,
    inserted_at: Instant,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicUsize,
    misses: AtomicUsize,
}

/// Shared (source, language) -> translation memo with a per-entry lifetime.
/// Clones share storage and counters.
#[derive(Debug, Clone)]
pub struct TranslationCache {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
    counters: Arc<Counters>,
    ttl: Duration,
    enabled: bool,
}

impl TranslationCache {
    pub fn new(enabled: bool, ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            counters: Arc::new(Counters::default()),
            ttl,
            enabled,
        }
    }

    /// Live translation for `source_text`, if any. An expired entry is
    /// removed and counted as a miss.
    pub fn get(&self, source_text: &str, target_language: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey::new(source_text, target_language);
        let lookup = self
            .entries
            .read()
            .get(&key)
            .map(|entry| (entry.inserted_at.elapsed() < self.ttl, entry.translation.clone()));

        match lookup {
            Some((true, translation)) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!("Cache hit for '{}'", preview(source_text));
                Some(translation)
            }
            Some((false, _)) => {
                self.entries.write().remove(&key);
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                debug!("Cache entry for '{}' outlived its ttl", preview(source_text));
                None
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn store(&self, source_text: &str, target_language: &str, translation: &str) {
        if !self.enabled {
            return;
        }

        self.entries.write().insert(
            CacheKey::new(source_text, target_language),
            CacheEntry {
                translation: translation.to_string(),
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every expired entry, returning how many went
    pub fn evict_expired(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| entry.inserted_at.elapsed() < self.ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!("Evicted {} expired cache entries", evicted);
        }
        evicted
    }

    /// `(hits, misses, hit ratio)` since creation
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = self.counters.hits.load(Ordering::Relaxed);
        let misses = self.counters.misses.load(Ordering::Relaxed);
        let ratio = match hits + misses {
            0 => 0.0,
            lookups => hits as f64 / lookups as f64,
        };
        (hits, misses, ratio)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// First 30 characters of `text` for log lines
fn preview(text: &str) -> String {
    const LIMIT: usize = 30;
    match text.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
