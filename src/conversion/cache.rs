/*!
 * Parsed dictionary caching.
 *
 * Parsing a large dictionary is the most expensive step of a small job, so
 * parsed dictionaries are kept by content hash and shared between jobs.
 */

use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;
use log::debug;
use sha2::{Digest, Sha256};

use crate::errors::DictionaryFormatError;
use super::dictionary::{ConversionDictionary, DictionaryFormat, DictionaryHandle};

/// Cache key combining the text digest and the line format
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    /// SHA-256 of the dictionary text
    digest: [u8; 32],

    /// Format the text was parsed with
    format: DictionaryFormat,
}

impl CacheKey {
    fn new(text: &str, format: &DictionaryFormat) -> Self {
        Self {
            digest: Sha256::digest(text.as_bytes()).into(),
            format: format.clone(),
        }
    }
}

/// Thread safe store of parsed dictionaries
pub struct DictionaryCache {
    /// Internal cache storage
    cache: Arc<RwLock<HashMap<CacheKey, DictionaryHandle>>>,

    /// Cache hit counter
    hits: Arc<RwLock<usize>>,

    /// Cache miss counter
    misses: Arc<RwLock<usize>>,

    /// Whether caching is enabled
    enabled: bool,
}

impl DictionaryCache {
    /// Create a new dictionary cache
    pub fn new(enabled: bool) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            hits: Arc::new(RwLock::new(0)),
            misses: Arc::new(RwLock::new(0)),
            enabled,
        }
    }

    /// Return the parsed dictionary for `text`, parsing it on a miss
    pub fn get_or_parse(
        &self,
        text: &str,
        format: &DictionaryFormat,
    ) -> Result<DictionaryHandle, DictionaryFormatError> {
        if !self.enabled {
            return ConversionDictionary::parse(text, format).map(Arc::new);
        }

        let key = CacheKey::new(text, format);
        if let Some(dictionary) = self.cache.read().get(&key) {
            *self.hits.write() += 1;
            debug!("Dictionary cache hit ({} entries)", dictionary.len());
            return Ok(dictionary.clone());
        }

        *self.misses.write() += 1;
        let dictionary = Arc::new(ConversionDictionary::parse(text, format)?);
        debug!("Dictionary cache miss, parsed {} entries", dictionary.len());

        // Another thread may have parsed the same text meanwhile; keep the first
        let mut cache = self.cache.write();
        Ok(cache.entry(key).or_insert(dictionary).clone())
    }

    /// Get cache statistics as (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let hits = *self.hits.read();
        let misses = *self.misses.read();
        let total = hits + misses;

        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        (hits, misses, hit_rate)
    }

    /// Clear the cache
    pub fn clear(&self) {
        self.cache.write().clear();
        *self.hits.write() = 0;
        *self.misses.write() = 0;

        debug!("Dictionary cache cleared");
    }

    /// Get the number of entries in the cache
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for DictionaryCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Clone for DictionaryCache {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            hits: self.hits.clone(),
            misses: self.misses.clone(),
            enabled: self.enabled,
        }
    }
}
