//! Two-tier cache manager with remote-to-local fallback

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::domain::cache::{
    CacheHealth, CacheKey, CacheParams, CacheStats, CacheStatus, InvalidationSummary, KeyDeriver,
    LocalStatus, RemoteError, RemoteStatus, RemoteStore,
};
use crate::domain::CacheError;
use crate::infrastructure::observability::{
    record_cache_lookup, record_invalidation, record_remote_failure, CacheTier, LookupOutcome,
};

use super::config::CacheConfig;
use super::local::{LocalStore, LocalStoreConfig};
use super::redis::{RedisRemoteConfig, RedisRemoteStore};

/// State of the remote tier, fixed when the manager is built
#[derive(Clone)]
pub enum RemoteTier {
    /// No remote URL configured; local-only is the intended setup
    NotConfigured,
    /// Configured, but the startup connection attempt failed
    Unavailable { reason: String },
    Connected(Arc<dyn RemoteStore>),
}

impl fmt::Debug for RemoteTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteTier::NotConfigured => f.write_str("NotConfigured"),
            RemoteTier::Unavailable { reason } => {
                f.debug_struct("Unavailable").field("reason", reason).finish()
            }
            RemoteTier::Connected(store) => f.debug_tuple("Connected").field(&store.name()).finish(),
        }
    }
}

impl RemoteTier {
    /// Attempts the remote connection described by `config`
    ///
    /// Never fails: a connection error yields `Unavailable`.
    pub async fn connect(config: &CacheConfig) -> Self {
        let Some(redis_config) = RedisRemoteConfig::from_cache_config(config) else {
            info!("Remote cache not configured, using local cache only");
            return RemoteTier::NotConfigured;
        };

        match RedisRemoteStore::connect(redis_config).await {
            Ok(store) => {
                info!("Remote cache connected");
                RemoteTier::Connected(Arc::new(store))
            }
            Err(e) => {
                warn!(error = %e, "Remote cache connection failed, using local cache only");
                RemoteTier::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn store(&self) -> Option<&Arc<dyn RemoteStore>> {
        match self {
            RemoteTier::Connected(store) => Some(store),
            _ => None,
        }
    }
}

/// Header value for responses served from a cacheable query
pub fn cache_control_value(ttl_seconds: u64) -> String {
    format!("public, max-age={}", ttl_seconds)
}

/// Cache for query results shared by request handlers
///
/// Reads go to the remote tier when it is connected; a remote hit or miss is
/// authoritative and the local tier is only consulted when the remote call
/// fails or the remote tier is absent. Writes go to the remote tier and only
/// land locally when the remote write fails or the remote tier is absent.
/// Remote errors are logged and absorbed, never returned.
pub struct CacheManager {
    keys: KeyDeriver,
    remote: RemoteTier,
    local: LocalStore,
    default_ttl: Duration,
}

impl fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheManager")
            .field("keys", &self.keys)
            .field("remote", &self.remote)
            .field("local", &self.local)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl CacheManager {
    /// Builds the manager, attempting the remote connection once
    pub async fn init(config: &CacheConfig) -> Result<Self, CacheError> {
        config.validate()?;
        let remote = RemoteTier::connect(config).await;
        Self::with_remote(config, remote)
    }

    /// Builds the manager around an already-resolved remote tier
    pub fn with_remote(config: &CacheConfig, remote: RemoteTier) -> Result<Self, CacheError> {
        config.validate()?;

        let local = LocalStore::with_config(
            LocalStoreConfig::default().with_max_capacity(config.local_max_capacity),
        );

        Ok(Self {
            keys: KeyDeriver::new(config.key_prefix.clone()),
            remote,
            local,
            default_ttl: config.default_ttl(),
        })
    }

    /// Builds a local-only manager
    pub fn local_only(config: &CacheConfig) -> Result<Self, CacheError> {
        Self::with_remote(config, RemoteTier::NotConfigured)
    }

    /// Releases cached state; called once at shutdown
    pub async fn close(&self) {
        let dropped = self.local.clear().await;
        info!(local_entries = dropped, "Cache manager closed");
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.store().is_some()
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Returns the key a namespace and parameter set map to
    pub fn key_for(&self, namespace: &str, params: &CacheParams) -> Result<CacheKey, CacheError> {
        self.keys.derive(namespace, params)
    }

    /// Looks up a cached value; `Ok(None)` is a miss
    pub async fn get<V>(&self, namespace: &str, params: &CacheParams) -> Result<Option<V>, CacheError>
    where
        V: DeserializeOwned,
    {
        let key = self.keys.derive(namespace, params)?;

        if let Some(remote) = self.remote.store() {
            let lookup = remote.get(key.as_str()).await.and_then(|raw| {
                raw.map(|data| {
                    serde_json::from_str::<V>(&data).map_err(|e| RemoteError::Decode(e.to_string()))
                })
                .transpose()
            });

            match lookup {
                Ok(Some(value)) => {
                    record_cache_lookup(CacheTier::Remote, LookupOutcome::Hit);
                    return Ok(Some(value));
                }
                Ok(None) => {
                    record_cache_lookup(CacheTier::Remote, LookupOutcome::Miss);
                    return Ok(None);
                }
                Err(e) => self.remote_failed("get", namespace, &e),
            }
        }

        let Some(data) = self.local.get(key.as_str()).await else {
            record_cache_lookup(CacheTier::Local, LookupOutcome::Miss);
            return Ok(None);
        };

        match serde_json::from_str::<V>(&data) {
            Ok(value) => {
                record_cache_lookup(CacheTier::Local, LookupOutcome::Hit);
                Ok(Some(value))
            }
            Err(e) => {
                warn!(namespace, error = %e, "Local cache entry has unexpected shape, treating as miss");
                record_cache_lookup(CacheTier::Local, LookupOutcome::Miss);
                Ok(None)
            }
        }
    }

    /// Stores a value; `ttl_seconds` defaults to the configured TTL
    pub async fn set<V>(
        &self,
        namespace: &str,
        params: &CacheParams,
        value: &V,
        ttl_seconds: Option<u64>,
    ) -> Result<(), CacheError>
    where
        V: Serialize + ?Sized,
    {
        let ttl = self.resolve_ttl(ttl_seconds)?;
        let key = self.keys.derive(namespace, params)?;
        let data = serde_json::to_string(value).map_err(|e| {
            CacheError::invalid_parameter(format!("Cache value is not serializable: {}", e))
        })?;

        if let Some(remote) = self.remote.store() {
            match remote.set(key.as_str(), &data, ttl).await {
                Ok(()) => {
                    debug!(key = %key, "Remote cache entry stored");
                    return Ok(());
                }
                Err(e) => self.remote_failed("set", namespace, &e),
            }
        }

        self.local.set(key.as_str(), data, ttl).await?;
        debug!(key = %key, "Local cache entry stored");
        Ok(())
    }

    /// Returns the cached value, or computes, stores and returns it
    ///
    /// A failure to store the computed value is logged and ignored.
    pub async fn get_or_compute<V, E, F, Fut>(
        &self,
        namespace: &str,
        params: &CacheParams,
        ttl_seconds: Option<u64>,
        compute: F,
    ) -> Result<V, E>
    where
        V: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.resolve_ttl(ttl_seconds)?;

        if let Some(cached) = self.get(namespace, params).await? {
            return Ok(cached);
        }

        let value = compute().await?;

        if let Err(e) = self.set(namespace, params, &value, ttl_seconds).await {
            warn!(namespace, error = %e, "Failed to cache computed value");
        }

        Ok(value)
    }

    /// Removes one entry from both tiers; idempotent
    pub async fn delete(&self, namespace: &str, params: &CacheParams) -> Result<(), CacheError> {
        let key = self.keys.derive(namespace, params)?;

        if let Some(remote) = self.remote.store() {
            if let Err(e) = remote.delete(key.as_str()).await {
                self.remote_failed("delete", namespace, &e);
            }
        }

        self.local.delete(key.as_str()).await;
        Ok(())
    }

    /// Removes every entry whose key contains `needle`, in both tiers
    ///
    /// Both tiers are always attempted; a remote failure is reported in the
    /// summary and does not stop the local sweep.
    pub async fn delete_pattern(&self, needle: &str) -> Result<InvalidationSummary, CacheError> {
        if needle.is_empty() {
            return Err(CacheError::invalid_parameter(
                "Invalidation pattern must not be empty",
            ));
        }

        let mut summary = InvalidationSummary::default();

        if let Some(remote) = self.remote.store() {
            let pattern = self.keys.substring_pattern(needle);
            self.remote_bulk_delete(remote.as_ref(), &pattern, "delete_pattern", needle, &mut summary)
                .await;
        }

        let keys = self.keys.clone();
        let owned_needle = needle.to_string();
        summary.local_deleted = self
            .local
            .delete_where(move |key| keys.key_contains(key, &owned_needle))
            .await?;

        let removed = summary.remote_deleted.unwrap_or(0) as u64 + summary.local_deleted;
        record_invalidation("pattern", removed);

        if removed > 0 {
            info!(
                pattern = needle,
                remote_deleted = summary.remote_deleted,
                local_deleted = summary.local_deleted,
                "Cache entries invalidated by pattern"
            );
        }

        Ok(summary)
    }

    /// Removes every entry owned by this cache from both tiers
    pub async fn clear_all(&self) -> Result<InvalidationSummary, CacheError> {
        let mut summary = InvalidationSummary::default();

        if let Some(remote) = self.remote.store() {
            let pattern = self.keys.prefix_pattern();
            self.remote_bulk_delete(remote.as_ref(), &pattern, "clear_all", "*", &mut summary)
                .await;
        }

        summary.local_deleted = self.local.clear().await;

        record_invalidation(
            "clear",
            summary.remote_deleted.unwrap_or(0) as u64 + summary.local_deleted,
        );
        info!(
            remote_deleted = summary.remote_deleted,
            local_deleted = summary.local_deleted,
            "Cache cleared"
        );

        Ok(summary)
    }

    /// Reports tier statistics; never fails
    pub async fn get_stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            remote_configured: !matches!(self.remote, RemoteTier::NotConfigured),
            remote_connected: self.remote_enabled(),
            local_entry_count: self.local.len().await,
            ..Default::default()
        };

        match &self.remote {
            RemoteTier::Connected(remote) => match remote.info().await {
                Ok(info) => {
                    stats.remote_used_memory = info.used_memory_human;
                    stats.remote_connected_clients = info.connected_clients;
                    stats.remote_total_commands_processed = info.total_commands_processed;
                }
                Err(e) => {
                    self.remote_failed("stats", "*", &e);
                    stats.remote_error = Some(e.to_string());
                }
            },
            RemoteTier::Unavailable { reason } => stats.remote_error = Some(reason.clone()),
            RemoteTier::NotConfigured => {}
        }

        stats
    }

    /// Reports whether the cache is serving from its configured tiers
    pub async fn health_check(&self) -> CacheHealth {
        let (cache_status, remote_status, remote_error) = match &self.remote {
            RemoteTier::NotConfigured => (CacheStatus::Healthy, RemoteStatus::NotConfigured, None),
            RemoteTier::Unavailable { reason } => (
                CacheStatus::Degraded,
                RemoteStatus::Disconnected,
                Some(reason.clone()),
            ),
            RemoteTier::Connected(remote) => match remote.ping().await {
                Ok(()) => (CacheStatus::Healthy, RemoteStatus::Connected, None),
                Err(e) => {
                    self.remote_failed("ping", "*", &e);
                    (CacheStatus::Degraded, RemoteStatus::Error, Some(e.to_string()))
                }
            },
        };

        CacheHealth {
            cache_status,
            remote_status,
            remote_error,
            local_status: LocalStatus::Active,
        }
    }

    fn resolve_ttl(&self, ttl_seconds: Option<u64>) -> Result<Duration, CacheError> {
        match ttl_seconds {
            None => Ok(self.default_ttl),
            Some(0) => Err(CacheError::invalid_parameter("TTL must be a positive number of seconds")),
            Some(secs) => Ok(Duration::from_secs(secs)),
        }
    }

    async fn remote_bulk_delete(
        &self,
        remote: &dyn RemoteStore,
        pattern: &str,
        operation: &'static str,
        namespace: &str,
        summary: &mut InvalidationSummary,
    ) {
        let result = match remote.list_keys(pattern).await {
            Ok(keys) if keys.is_empty() => Ok(0),
            Ok(keys) => remote.delete_many(&keys).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(deleted) => summary.remote_deleted = Some(deleted),
            Err(e) => {
                self.remote_failed(operation, namespace, &e);
                summary.remote_error = Some(e.to_string());
            }
        }
    }

    fn remote_failed(&self, operation: &'static str, namespace: &str, error: &RemoteError) {
        record_remote_failure(operation);
        warn!(
            operation,
            namespace,
            error = %error,
            "Remote cache call failed, falling back to local cache"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cache::{FakeRemoteStore, MockRemoteStore, RemoteInfo};
    use serde_json::{json, Value};

    fn config() -> CacheConfig {
        CacheConfig::local_only()
    }

    fn local_manager() -> CacheManager {
        CacheManager::local_only(&config()).unwrap()
    }

    fn remote_manager(store: Arc<FakeRemoteStore>) -> CacheManager {
        CacheManager::with_remote(&config(), RemoteTier::Connected(store)).unwrap()
    }

    fn active(flag: bool) -> CacheParams {
        CacheParams::new().with("is_active", flag)
    }

    #[tokio::test]
    async fn test_semesters_scenario() {
        let cache = local_manager();
        let semesters = json!([{"id": 1, "name": "Fall"}]);

        cache.set("semesters", &active(true), &semesters, Some(300)).await.unwrap();

        let hit: Option<Value> = cache.get("semesters", &active(true)).await.unwrap();
        assert_eq!(hit, Some(semesters));

        let miss: Option<Value> = cache.get("semesters", &active(false)).await.unwrap();
        assert_eq!(miss, None);
    }

    #[tokio::test]
    async fn test_falsy_values_are_hits() {
        let cache = local_manager();
        let params = CacheParams::new();

        cache.set("empty", &params, &Vec::<i32>::new(), None).await.unwrap();
        cache.set("zero", &params, &0, None).await.unwrap();
        cache.set("flag", &params, &false, None).await.unwrap();

        assert_eq!(cache.get::<Vec<i32>>("empty", &params).await.unwrap(), Some(vec![]));
        assert_eq!(cache.get::<i32>("zero", &params).await.unwrap(), Some(0));
        assert_eq!(cache.get::<bool>("flag", &params).await.unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_remote_round_trip_skips_local() {
        let store = Arc::new(FakeRemoteStore::new());
        let cache = remote_manager(store.clone());

        cache.set("grades", &CacheParams::new(), &json!([1, 2]), Some(60)).await.unwrap();

        let key = cache.key_for("grades", &CacheParams::new()).unwrap();
        assert!(store.contains(key.as_str()));
        assert_eq!(store.ttl_of(key.as_str()), Some(Duration::from_secs(60)));
        assert_eq!(cache.local.len().await, 0);

        let hit: Option<Value> = cache.get("grades", &CacheParams::new()).await.unwrap();
        assert_eq!(hit, Some(json!([1, 2])));
    }

    #[tokio::test]
    async fn test_default_ttl_applied() {
        let store = Arc::new(FakeRemoteStore::new());
        let cache = remote_manager(store.clone());

        cache.set("grades", &CacheParams::new(), &1, None).await.unwrap();

        let key = cache.key_for("grades", &CacheParams::new()).unwrap();
        assert_eq!(store.ttl_of(key.as_str()), Some(Duration::from_secs(300)));
    }

    #[tokio::test]
    async fn test_fallback_when_remote_always_fails() {
        let store = Arc::new(FakeRemoteStore::unreachable());
        let cache = remote_manager(store.clone());

        cache.set("grades", &active(true), &json!({"id": 7}), Some(60)).await.unwrap();

        let hit: Option<Value> = cache.get("grades", &active(true)).await.unwrap();
        assert_eq!(hit, Some(json!({"id": 7})));
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn test_remote_miss_is_authoritative() {
        let store = Arc::new(FakeRemoteStore::unreachable());
        let cache = remote_manager(store.clone());

        // Written locally during the outage
        cache.set("grades", &active(true), &1, Some(60)).await.unwrap();

        store.set_failing(false);

        let result: Option<i32> = cache.get("grades", &active(true)).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_undecodable_remote_payload_falls_back() {
        let store = Arc::new(FakeRemoteStore::new());
        let cache = remote_manager(store.clone());
        let key = cache.key_for("grades", &CacheParams::new()).unwrap();

        store.insert_raw(key.as_str(), "not json");
        cache.local.set(key.as_str(), "5".to_string(), Duration::from_secs(60)).await.unwrap();

        let result: Option<i32> = cache.get("grades", &CacheParams::new()).await.unwrap();
        assert_eq!(result, Some(5));
    }

    #[tokio::test]
    async fn test_local_miss_without_remote() {
        let cache = local_manager();

        let result: Option<Value> = cache.get("grades", &CacheParams::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_expiry() {
        let cache = local_manager();

        cache.set("grades", &CacheParams::new(), &"A", Some(1)).await.unwrap();
        assert!(cache.get::<String>("grades", &CacheParams::new()).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert!(cache.get::<String>("grades", &CacheParams::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_zero_ttl_rejected() {
        let cache = local_manager();

        let result = cache.set("grades", &CacheParams::new(), &1, Some(0)).await;
        assert!(matches!(result, Err(CacheError::InvalidParameter { .. })));
    }

    #[tokio::test]
    async fn test_unserializable_value_rejected() {
        use std::collections::HashMap;

        let cache = local_manager();
        let mut value = HashMap::new();
        value.insert(vec![1u8], "non-string keys cannot become JSON");

        let result = cache.set("grades", &CacheParams::new(), &value, None).await;
        assert!(matches!(result, Err(CacheError::InvalidParameter { .. })));
    }

    #[tokio::test]
    async fn test_empty_namespace_rejected() {
        let cache = local_manager();

        let result = cache.get::<Value>("", &CacheParams::new()).await;
        assert!(matches!(result, Err(CacheError::InvalidParameter { .. })));
    }

    #[tokio::test]
    async fn test_delete_twice_is_noop() {
        let store = Arc::new(FakeRemoteStore::new());
        let cache = remote_manager(store.clone());

        cache.set("grades", &active(true), &1, None).await.unwrap();

        cache.delete("grades", &active(true)).await.unwrap();
        cache.delete("grades", &active(true)).await.unwrap();

        assert_eq!(store.len(), 0);
        assert!(cache.get::<i32>("grades", &active(true)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_reaches_local_when_remote_fails() {
        let store = Arc::new(FakeRemoteStore::unreachable());
        let cache = remote_manager(store.clone());

        cache.set("grades", &active(true), &1, None).await.unwrap();
        cache.delete("grades", &active(true)).await.unwrap();

        assert_eq!(cache.local.len().await, 0);
    }

    #[tokio::test]
    async fn test_delete_pattern_local() {
        let cache = local_manager();

        for id in 0..3 {
            let params = CacheParams::new().with("id", id);
            cache.set("grades", &params, &id, None).await.unwrap();
            cache.set("semesters", &params, &id, None).await.unwrap();
        }

        let summary = cache.delete_pattern("grades").await.unwrap();

        assert_eq!(summary.local_deleted, 3);
        assert_eq!(summary.remote_deleted, None);

        for id in 0..3 {
            let params = CacheParams::new().with("id", id);
            assert!(cache.get::<i32>("grades", &params).await.unwrap().is_none());
            assert_eq!(cache.get::<i32>("semesters", &params).await.unwrap(), Some(id));
        }
    }

    #[tokio::test]
    async fn test_delete_pattern_remote() {
        let store = Arc::new(FakeRemoteStore::new());
        let cache = remote_manager(store.clone());

        cache.set("grades", &active(true), &1, None).await.unwrap();
        cache.set("grades", &active(false), &2, None).await.unwrap();
        cache.set("semesters", &active(true), &3, None).await.unwrap();
        store.insert_raw("other-app:grades:1", "1");

        let summary = cache.delete_pattern("grades").await.unwrap();

        assert_eq!(summary.remote_deleted, Some(2));
        assert!(store.contains("other-app:grades:1"));
        assert_eq!(cache.get::<i32>("semesters", &active(true)).await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_delete_pattern_sweeps_local_despite_remote_failure() {
        let store = Arc::new(FakeRemoteStore::unreachable());
        let cache = remote_manager(store.clone());

        cache.set("grades", &active(true), &1, None).await.unwrap();
        cache.set("semesters", &active(true), &2, None).await.unwrap();

        let summary = cache.delete_pattern("grades").await.unwrap();

        assert_eq!(summary.remote_deleted, None);
        assert!(summary.remote_error.is_some());
        assert_eq!(summary.local_deleted, 1);
        assert_eq!(cache.local.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_pattern_rejects_empty() {
        let cache = local_manager();

        assert!(cache.delete_pattern("").await.is_err());
    }

    #[tokio::test]
    async fn test_clear_all() {
        let store = Arc::new(FakeRemoteStore::new());
        let cache = remote_manager(store.clone());

        cache.set("grades", &active(true), &1, None).await.unwrap();
        cache.set("semesters", &active(true), &2, None).await.unwrap();
        cache.local.set("cache:stale:1", "1".to_string(), Duration::from_secs(60)).await.unwrap();
        store.insert_raw("sessions:abc", "1");

        let summary = cache.clear_all().await.unwrap();

        assert_eq!(summary.remote_deleted, Some(2));
        assert_eq!(summary.local_deleted, 1);
        assert_eq!(store.len(), 1);
        assert!(store.contains("sessions:abc"));
        assert_eq!(cache.local.len().await, 0);
    }

    #[tokio::test]
    async fn test_get_or_compute() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let cache = local_manager();
        let params = CacheParams::new().with("subject_id", 4);
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Result<Vec<i32>, CacheError> = cache
                .get_or_compute("questions", &params, None, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![1, 2, 3])
                })
                .await;
            assert_eq!(value.unwrap(), vec![1, 2, 3]);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_get_or_compute_does_not_cache_errors() {
        let cache = local_manager();
        let params = CacheParams::new();

        let failed: Result<i32, CacheError> = cache
            .get_or_compute("questions", &params, None, || async {
                Err(CacheError::local_store("database down"))
            })
            .await;
        assert!(failed.is_err());

        assert!(cache.get::<i32>("questions", &params).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_health_local_only_is_healthy() {
        let health = local_manager().health_check().await;

        assert_eq!(health.cache_status, CacheStatus::Healthy);
        assert_eq!(health.remote_status, RemoteStatus::NotConfigured);
        assert_eq!(health.local_status, LocalStatus::Active);
    }

    #[tokio::test]
    async fn test_health_connected() {
        let cache = remote_manager(Arc::new(FakeRemoteStore::new()));
        let health = cache.health_check().await;

        assert_eq!(health.cache_status, CacheStatus::Healthy);
        assert_eq!(health.remote_status, RemoteStatus::Connected);
    }

    #[tokio::test]
    async fn test_health_degraded_when_remote_fails() {
        let cache = remote_manager(Arc::new(FakeRemoteStore::unreachable()));
        let health = cache.health_check().await;

        assert_eq!(health.cache_status, CacheStatus::Degraded);
        assert_eq!(health.remote_status, RemoteStatus::Error);
        assert!(health.remote_error.is_some());
    }

    #[tokio::test]
    async fn test_health_degraded_when_never_connected() {
        let cache = CacheManager::with_remote(
            &config(),
            RemoteTier::Unavailable {
                reason: "connection refused".to_string(),
            },
        )
        .unwrap();

        let health = cache.health_check().await;
        assert_eq!(health.cache_status, CacheStatus::Degraded);
        assert_eq!(health.remote_status, RemoteStatus::Disconnected);
        assert!(!cache.remote_enabled());
    }

    #[tokio::test]
    async fn test_stats_with_remote() {
        let store = Arc::new(FakeRemoteStore::new());
        let cache = remote_manager(store.clone());

        let stats = cache.get_stats().await;

        assert!(stats.remote_configured);
        assert!(stats.remote_connected);
        assert_eq!(stats.remote_used_memory.as_deref(), Some("1.00M"));
        assert_eq!(stats.remote_connected_clients, Some(1));
        assert!(stats.remote_error.is_none());
    }

    #[tokio::test]
    async fn test_stats_capture_remote_error() {
        let store = Arc::new(FakeRemoteStore::unreachable());
        let cache = remote_manager(store.clone());

        cache.set("grades", &CacheParams::new(), &1, None).await.unwrap();
        let stats = cache.get_stats().await;

        assert!(stats.remote_connected);
        assert_eq!(stats.local_entry_count, 1);
        assert!(stats.remote_error.is_some());
        assert!(stats.remote_used_memory.is_none());
    }

    #[tokio::test]
    async fn test_stats_local_only() {
        let cache = local_manager();
        cache.set("grades", &CacheParams::new(), &1, None).await.unwrap();

        let stats = cache.get_stats().await;

        assert!(!stats.remote_configured);
        assert!(!stats.remote_connected);
        assert_eq!(stats.local_entry_count, 1);
    }

    #[tokio::test]
    async fn test_remote_set_failure_writes_local_once() {
        let mut remote = MockRemoteStore::new();
        remote
            .expect_set()
            .times(1)
            .returning(|_, _, _| Err(RemoteError::Timeout(Duration::from_secs(5))));
        remote
            .expect_get()
            .times(1)
            .returning(|_| Err(RemoteError::Timeout(Duration::from_secs(5))));

        let cache =
            CacheManager::with_remote(&config(), RemoteTier::Connected(Arc::new(remote))).unwrap();

        cache.set("grades", &active(true), &42, Some(30)).await.unwrap();
        assert_eq!(cache.get::<i32>("grades", &active(true)).await.unwrap(), Some(42));
    }

    #[tokio::test]
    async fn test_remote_hit_does_not_touch_local() {
        let mut remote = MockRemoteStore::new();
        remote
            .expect_get()
            .withf(|key: &str| key.starts_with("cache:grades:"))
            .times(1)
            .returning(|_| Ok(Some("[1]".to_string())));
        remote.expect_info().returning(|| Ok(RemoteInfo::default()));

        let cache =
            CacheManager::with_remote(&config(), RemoteTier::Connected(Arc::new(remote))).unwrap();

        let hit: Option<Vec<i32>> = cache.get("grades", &CacheParams::new()).await.unwrap();
        assert_eq!(hit, Some(vec![1]));
        assert_eq!(cache.get_stats().await.local_entry_count, 0);
    }

    #[tokio::test]
    async fn test_full_local_tier_keeps_fresh_writes() {
        let cache = CacheManager::local_only(&config().with_local_max_capacity(10)).unwrap();

        for id in 0..10 {
            let params = CacheParams::new().with("id", id);
            cache.set("hot", &params, &id, Some(60)).await.unwrap();
            for _ in 0..5 {
                assert!(cache.get::<i32>("hot", &params).await.unwrap().is_some());
            }
        }

        for id in 0..20 {
            let params = CacheParams::new().with("id", id);
            cache.set("fresh", &params, &id, Some(60)).await.unwrap();
            cache.get_stats().await;

            assert_eq!(cache.get::<i32>("fresh", &params).await.unwrap(), Some(id));
        }
    }

    #[tokio::test]
    async fn test_close_clears_local() {
        let cache = local_manager();
        cache.set("grades", &CacheParams::new(), &1, None).await.unwrap();

        cache.close().await;

        assert_eq!(cache.local.len().await, 0);
    }

    #[tokio::test]
    async fn test_init_local_only() {
        let cache = CacheManager::init(&config()).await.unwrap();

        assert!(!cache.remote_enabled());
        assert_eq!(cache.default_ttl(), Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_init_with_unreachable_remote_degrades() {
        let config = CacheConfig::remote("redis://127.0.0.1:1")
            .with_timeouts(Duration::from_secs(1), Duration::from_secs(1));

        let cache = CacheManager::init(&config).await.unwrap();

        assert!(!cache.remote_enabled());
        cache.set("grades", &CacheParams::new(), &1, None).await.unwrap();
        assert_eq!(cache.get::<i32>("grades", &CacheParams::new()).await.unwrap(), Some(1));
        assert_eq!(cache.health_check().await.cache_status, CacheStatus::Degraded);
    }

    #[tokio::test]
    async fn test_init_rejects_invalid_config() {
        let result = CacheManager::init(&config().with_default_ttl_secs(0)).await;

        assert!(matches!(result, Err(CacheError::Configuration { .. })));
    }

    #[test]
    fn test_cache_control_value() {
        assert_eq!(cache_control_value(300), "public, max-age=300");
    }
}
