//! In-process fallback store using moka

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::Expiry;
use moka::future::Cache as MokaCache;
use moka::policy::EvictionPolicy;

use crate::domain::CacheError;

/// Configuration for the local store
#[derive(Debug, Clone)]
pub struct LocalStoreConfig {
    /// Maximum number of entries
    pub max_capacity: u64,
}

impl Default for LocalStoreConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

impl LocalStoreConfig {
    pub fn with_max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = capacity;
        self
    }
}

/// Entry stored in moka
#[derive(Debug, Clone)]
struct LocalEntry {
    /// Serialized JSON value
    data: Arc<str>,
    expires_at: Instant,
    ttl: Duration,
}

/// Per-entry expiry; updates restart the clock with the new TTL
struct EntryExpiry;

impl Expiry<String, LocalEntry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &LocalEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &LocalEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Thread-safe in-process key/value store with per-entry expiry
///
/// Expiry is a hard cutoff checked on every read (`now >= expires_at` is a
/// miss, and the entry is dropped). moka also drops expired entries during
/// its own maintenance. Once `max_capacity` is reached the least recently
/// used entry is evicted, so a new write is always admitted.
#[derive(Debug)]
pub struct LocalStore {
    cache: MokaCache<String, LocalEntry>,
    config: LocalStoreConfig,
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalStore {
    pub fn new() -> Self {
        Self::with_config(LocalStoreConfig::default())
    }

    pub fn with_config(config: LocalStoreConfig) -> Self {
        let cache = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .eviction_policy(EvictionPolicy::lru())
            .expire_after(EntryExpiry)
            .build();

        Self { cache, config }
    }

    pub fn config(&self) -> &LocalStoreConfig {
        &self.config
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        match self.cache.get(key).await {
            Some(entry) if Instant::now() < entry.expires_at => Some(entry.data.to_string()),
            _ => {
                // moka hides entries past their expiry before evicting them
                self.cache.invalidate(key).await;
                None
            }
        }
    }

    pub async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now().checked_add(ttl).ok_or_else(|| {
            CacheError::invalid_parameter(format!("TTL of {:?} is out of range", ttl))
        })?;

        let entry = LocalEntry {
            data: Arc::from(value),
            expires_at,
            ttl,
        };

        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    /// Removes an entry; returns whether a live entry was present
    pub async fn delete(&self, key: &str) -> bool {
        self.cache
            .remove(key)
            .await
            .is_some_and(|entry| Instant::now() < entry.expires_at)
    }

    /// Removes every entry whose key satisfies `predicate`
    pub async fn delete_where<F>(&self, predicate: F) -> Result<u64, CacheError>
    where
        F: Fn(&str) -> bool + Send + 'static,
    {
        self.cache.run_pending_tasks().await;

        let cache = self.cache.clone();
        let keys: Vec<Arc<String>> = tokio::task::spawn_blocking(move || {
            cache
                .iter()
                .filter(|(key, _)| predicate(key.as_str()))
                .map(|(key, _)| key)
                .collect()
        })
        .await
        .map_err(|e| CacheError::local_store(format!("Failed to scan local cache: {}", e)))?;

        let mut deleted = 0;

        for key in keys {
            if self.cache.remove(key.as_str()).await.is_some() {
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    /// Removes all entries, returning how many were held
    pub async fn clear(&self) -> u64 {
        let held = self.len().await;
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        held
    }

    /// Number of live entries; expired entries awaiting eviction are skipped
    pub async fn len(&self) -> u64 {
        self.cache.run_pending_tasks().await;

        let now = Instant::now();
        self.cache
            .iter()
            .filter(|(_, entry)| now < entry.expires_at)
            .count() as u64
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
