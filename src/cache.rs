//! Rendered playlist cache
//!
//! Loader output is deterministic for a given model, so rendered playlists
//! can be cached by request key. Least-recently-used entries are evicted
//! once the memory or entry limit is reached.

use bytes::Bytes;
use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::config::CacheConfig;
use crate::error::Result;
use crate::loader::Loader;

/// Cache entry with metadata
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Bytes,
    pub last_accessed: Instant,
    pub access_count: usize,
}

impl CacheEntry {
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            last_accessed: Instant::now(),
            access_count: 1,
        }
    }

    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
        self.access_count += 1;
    }
}

/// LRU cache of rendered playlists
pub struct PlaylistCache {
    entries: DashMap<String, CacheEntry>,
    memory_bytes: AtomicUsize,
    config: CacheConfig,
}

impl PlaylistCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            memory_bytes: AtomicUsize::new(0),
            config,
        }
    }

    /// Key of a master playlist
    pub fn master_key(namespace: &str) -> String {
        namespace.to_string()
    }

    /// Key of a media playlist of a master playlist
    pub fn media_key(namespace: &str, index: usize) -> String {
        format!("{}:{}", namespace, index)
    }

    pub fn get(&self, key: &str) -> Option<Bytes> {
        let mut entry = self.entries.get_mut(key)?;
        entry.touch();
        Some(entry.data.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn insert(&self, key: String, data: Bytes) {
        let size = data.len();
        if size > self.config.max_memory_bytes() {
            tracing::debug!("Not caching {} ({} bytes exceeds limit)", key, size);
            return;
        }

        let replaced = self.entries.get(&key).map(|e| e.data.len());
        let current = self
            .memory_bytes
            .load(Ordering::Relaxed)
            .saturating_sub(replaced.unwrap_or(0));
        let over_memory = current + size > self.config.max_memory_bytes();
        let over_count = replaced.is_none() && self.entries.len() >= self.config.max_entries;
        if over_memory || over_count {
            self.evict_for(size);
        }

        // Concurrent misses on one key may both insert; only the entry that
        // ends up in the map stays accounted.
        self.memory_bytes.fetch_add(size, Ordering::Relaxed);
        if let Some(old) = self.entries.insert(key, CacheEntry::new(data)) {
            self.memory_bytes
                .fetch_sub(old.data.len(), Ordering::Relaxed);
        }
    }

    /// Evict least-recently-used entries until `needed` bytes and one entry fit
    fn evict_for(&self, needed: usize) {
        let mut by_age: Vec<(String, Instant)> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().last_accessed))
            .collect();
        by_age.sort_by_key(|(_, accessed)| *accessed);

        for (key, _) in by_age {
            let fits_memory =
                self.memory_bytes.load(Ordering::Relaxed) + needed <= self.config.max_memory_bytes();
            let fits_count = self.entries.len() < self.config.max_entries;
            if fits_memory && fits_count {
                break;
            }
            if let Some((_, entry)) = self.entries.remove(&key) {
                self.memory_bytes
                    .fetch_sub(entry.data.len(), Ordering::Relaxed);
                tracing::debug!("Evicted cached playlist {}", key);
            }
        }
    }

    /// Remove the master playlist and all media playlists of `namespace`
    pub fn remove_master(&self, namespace: &str) {
        let prefix = format!("{}:", namespace);
        let mut freed = 0;
        self.entries.retain(|key, entry| {
            if key == namespace || key.starts_with(&prefix) {
                freed += entry.data.len();
                false
            } else {
                true
            }
        });
        self.memory_bytes.fetch_sub(freed, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get current memory usage in bytes
    pub fn memory_usage(&self) -> usize {
        self.memory_bytes.load(Ordering::Relaxed)
    }
}

impl Default for PlaylistCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

/// A [`Loader`] whose successful results are cached.
///
/// Keys are namespaced by the master playlist path plus a fingerprint of
/// the model and the resolver, so loaders sharing one cache never see
/// each other's output. Errors are not cached; a failing request fails the
/// same way each time.
pub struct CachedLoader {
    loader: Loader,
    cache: Arc<PlaylistCache>,
    namespace: String,
}

impl CachedLoader {
    pub fn new(loader: Loader, cache: Arc<PlaylistCache>) -> Self {
        let mut hasher = DefaultHasher::new();
        loader.master().hash(&mut hasher);
        loader.resolver().hash(&mut hasher);
        let namespace = format!("{}#{:016x}", loader.master().path, hasher.finish());
        Self {
            loader,
            cache,
            namespace,
        }
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Key prefix of this loader's entries, for [`PlaylistCache::remove_master`]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn load_master_playlist(&self) -> Result<Bytes> {
        let key = PlaylistCache::master_key(&self.namespace);
        if let Some(data) = self.cache.get(&key) {
            return Ok(data);
        }
        let data = self.loader.load_master_playlist()?;
        self.cache.insert(key, data.clone());
        Ok(data)
    }

    pub fn load_media_playlist(&self, index: usize) -> Result<Bytes> {
        let key = PlaylistCache::media_key(&self.namespace, index);
        if let Some(data) = self.cache.get(&key) {
            return Ok(data);
        }
        let data = self.loader.load_media_playlist(index)?;
        self.cache.insert(key, data.clone());
        Ok(data)
    }
}
