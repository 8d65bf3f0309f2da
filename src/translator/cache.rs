//! Bounded memo of translation results.

use super::{Engine, TranslateResult};
use crate::i18n::LanguageCode;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Default number of results kept per translator.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Exact identity of a translation call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub engine: Engine,
    pub from: LanguageCode,
    pub to: LanguageCode,
    pub text: String,
}

impl CacheKey {
    pub fn new(engine: Engine, from: LanguageCode, to: LanguageCode, text: &str) -> Self {
        Self {
            engine,
            from,
            to,
            text: text.to_string(),
        }
    }
}

/// Least-recently-used cache of translation results.
///
/// Entries never expire by time, only when capacity is reached.
pub struct TranslationCache {
    entries: LruCache<CacheKey, TranslateResult>,
    hits: u64,
    misses: u64,
}

impl TranslationCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Look up a result, marking it as most recently used.
    pub fn get(&mut self, key: &CacheKey) -> Option<TranslateResult> {
        match self.entries.get(key) {
            Some(result) => {
                self.hits += 1;
                Some(result.clone())
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn put(&mut self, key: CacheKey, result: TranslateResult) {
        self.entries.put(key, result);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(NonZeroUsize::new(DEFAULT_CAPACITY).expect("default capacity is non-zero"))
    }
}
