/*!
 * Translation caching functionality.
 *
 * This module provides a persistent, content-addressed cache of translations.
 * Keys are fingerprints of the normalized source text, the target language
 * and the source document identity, so a restarted run finds everything a
 * previous run already translated.
 */

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::file_utils::FileManager;

/// Collapse internal whitespace runs and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Deterministic cache key for a (text, target language, document) tuple
pub fn fingerprint(source_text: &str, target_language: &str, document_identity: &str) -> String {
    let mut hasher = Sha256::new();
    for part in [
        normalize_whitespace(source_text),
        target_language.trim().to_lowercase(),
        document_identity.to_string(),
    ] {
        // Length prefixes keep ("ab", "c") and ("a", "bc") apart
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Name of the cache file for a document and target language
pub fn cache_file_name(source_file: &Path, target_language: &str) -> String {
    let stem = source_file.file_stem().unwrap_or_default().to_string_lossy();
    let identity = document_identity(source_file);
    let digest = format!("{:x}", Sha256::digest(identity.as_bytes()));
    let language = target_language.trim().to_lowercase();
    format!("translation_cache_{}_{}_{}.json", stem, language, &digest[..8])
}

/// Identity of a source document used in fingerprints
pub fn document_identity(source_file: &Path) -> String {
    source_file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| source_file.to_string_lossy().to_string())
}

/// A cached translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub translation: String,
    pub timestamp: DateTime<Utc>,
}

/// Persisted value; older cache files stored bare strings
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredValue {
    Entry(CacheEntry),
    Plain(String),
}

impl From<StoredValue> for CacheEntry {
    fn from(value: StoredValue) -> Self {
        match value {
            StoredValue::Entry(entry) => entry,
            StoredValue::Plain(translation) => CacheEntry {
                translation,
                timestamp: DateTime::<Utc>::default(),
            },
        }
    }
}

/// Persistent translation cache.
///
/// Clones share the same map. All mutation happens through `put`, which the
/// batch engine only calls from its coordinating loop.
#[derive(Clone)]
pub struct CacheStore {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,

    /// Lookup counters as (hits, misses)
    stats: Arc<RwLock<(usize, usize)>>,

    /// Whether caching is enabled
    enabled: bool,
}

impl CacheStore {
    /// Create an empty cache
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new((0, 0))),
            enabled,
        }
    }

    /// Load a cache file; a missing or malformed file yields an empty cache
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let store = Self::new(true);

        if !FileManager::file_exists(path) {
            info!("No translation cache at {}, starting fresh", path.display());
            return store;
        }

        let parsed = FileManager::read_to_string(path).and_then(|content| {
            serde_json::from_str::<HashMap<String, StoredValue>>(&content)
                .with_context(|| format!("Malformed cache file: {}", path.display()))
        });

        match parsed {
            Ok(raw) => {
                let entries: HashMap<String, CacheEntry> =
                    raw.into_iter().map(|(key, value)| (key, value.into())).collect();
                info!("Loaded cache with {} entries from {}", entries.len(), path.display());
                *store.entries.write() = entries;
            }
            Err(e) => {
                warn!("Failed to load cache, starting empty: {:#}", e);
            }
        }

        store
    }

    /// Get a translation from the cache
    pub fn get(&self, key: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let found = self.entries.read().get(key).map(|entry| entry.translation.clone());
        let short_key: String = key.chars().take(12).collect();
        let mut stats = self.stats.write();
        match found {
            Some(_) => {
                stats.0 += 1;
                debug!("Cache hit for {}", short_key);
            }
            None => {
                stats.1 += 1;
                debug!("Cache miss for {}", short_key);
            }
        }
        found
    }

    /// Store a translation; the last write for a key wins
    pub fn put(&self, key: impl Into<String>, translation: impl Into<String>) {
        if !self.enabled {
            return;
        }

        let entry = CacheEntry {
            translation: translation.into(),
            timestamp: Utc::now(),
        };
        self.entries.write().insert(key.into(), entry);
    }

    /// Persist the cache atomically
    pub fn flush<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let path = path.as_ref();
        let content = {
            let entries = self.entries.read();
            serde_json::to_string_pretty(&*entries).context("Failed to serialize translation cache")?
        };
        FileManager::write_atomic(path, &content)?;

        debug!("Saved cache with {} entries to {}", self.len(), path.display());
        Ok(())
    }

    /// Get cache statistics as (hits, misses, hit rate)
    pub fn stats(&self) -> (usize, usize, f64) {
        let (hits, misses) = *self.stats.read();
        let total = hits + misses;
        let hit_rate = if total > 0 { hits as f64 / total as f64 } else { 0.0 };
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

    /// Check if the cache is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Location of the cache file for a document
pub fn cache_path_for(source_file: &Path, target_language: &str, cache_dir: Option<&Path>) -> PathBuf {
    let file_name = cache_file_name(source_file, target_language);
    match cache_dir {
        Some(dir) => dir.join(file_name),
        None => source_file.with_file_name(file_name),
    }
}
