//! Redis remote store

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, InfoDict, RedisError, RedisResult};

use crate::domain::cache::{RemoteError, RemoteInfo, RemoteStore};

use super::config::CacheConfig;

/// Keys fetched per SCAN round trip
const SCAN_BATCH: usize = 200;

/// Keys removed per DEL command
const DELETE_BATCH: usize = 500;

/// Configuration for the Redis adapter
#[derive(Clone)]
pub struct RedisRemoteConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379")
    pub url: String,
    /// Bound on establishing the connection and the initial PING
    pub connect_timeout: Duration,
    /// Bound on every command round trip
    pub read_timeout: Duration,
}

impl fmt::Debug for RedisRemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisRemoteConfig")
            .field("url", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

impl RedisRemoteConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
        }
    }

    /// Builds the adapter config from cache config; `None` when no URL is set
    pub fn from_cache_config(config: &CacheConfig) -> Option<Self> {
        let url = config.remote_url.as_deref()?.trim();

        if url.is_empty() {
            return None;
        }

        Some(Self {
            url: url.to_string(),
            connect_timeout: config.connect_timeout(),
            read_timeout: config.read_timeout(),
        })
    }
}

impl From<RedisError> for RemoteError {
    fn from(err: RedisError) -> Self {
        if err.is_timeout()
            || err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
        {
            RemoteError::Connection(err.to_string())
        } else {
            RemoteError::Protocol(err.to_string())
        }
    }
}

/// Redis-backed remote store
///
/// Features:
/// - Connection reuse via ConnectionManager (reconnects after drops)
/// - Every command bounded by the read timeout
/// - Non-blocking key enumeration with SCAN
#[derive(Clone)]
pub struct RedisRemoteStore {
    connection: ConnectionManager,
    config: RedisRemoteConfig,
}

impl fmt::Debug for RedisRemoteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisRemoteStore")
            .field("config", &self.config)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisRemoteStore {
    /// Connects and probes the server with PING
    pub async fn connect(config: RedisRemoteConfig) -> Result<Self, RemoteError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| RemoteError::Connection(format!("Invalid Redis URL: {}", e)))?;

        let connection = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| RemoteError::Timeout(config.connect_timeout))??;

        let store = Self { connection, config };
        store.ping().await?;

        Ok(store)
    }

    async fn bounded<T, F>(&self, command: F) -> Result<T, RemoteError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.config.read_timeout, command).await {
            Ok(result) => result.map_err(RemoteError::from),
            Err(_) => Err(RemoteError::Timeout(self.config.read_timeout)),
        }
    }
}

#[async_trait]
impl RemoteStore for RedisRemoteStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, RemoteError> {
        let mut conn = self.connection.clone();
        self.bounded(conn.get(key)).await
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RemoteError> {
        let mut conn = self.connection.clone();
        let ttl_secs = ttl.as_secs().max(1);

        let _: () = self.bounded(conn.set_ex(key, value, ttl_secs)).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, RemoteError> {
        let mut conn = self.connection.clone();

        let deleted: i64 = self.bounded(conn.del(key)).await?;
        Ok(deleted > 0)
    }

    async fn list_keys(&self, pattern: &str) -> Result<Vec<String>, RemoteError> {
        let mut conn = self.connection.clone();
        let mut cursor = 0u64;
        let mut keys = Vec::new();

        loop {
            let (next_cursor, batch): (u64, Vec<String>) = self
                .bounded(
                    redis::cmd("SCAN")
                        .arg(cursor)
                        .arg("MATCH")
                        .arg(pattern)
                        .arg("COUNT")
                        .arg(SCAN_BATCH)
                        .query_async(&mut conn),
                )
                .await?;

            keys.extend(batch);
            cursor = next_cursor;

            if cursor == 0 {
                break;
            }
        }

        // SCAN may report a key more than once
        keys.sort_unstable();
        keys.dedup();

        Ok(keys)
    }

    async fn delete_many(&self, keys: &[String]) -> Result<usize, RemoteError> {
        let mut conn = self.connection.clone();
        let mut total_deleted = 0usize;

        for chunk in keys.chunks(DELETE_BATCH) {
            let deleted: usize = self.bounded(conn.del(chunk.to_vec())).await?;
            total_deleted += deleted;
        }

        Ok(total_deleted)
    }

    async fn ping(&self) -> Result<(), RemoteError> {
        let mut conn = self.connection.clone();

        let _: String = self
            .bounded(redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }

    async fn info(&self) -> Result<RemoteInfo, RemoteError> {
        let mut conn = self.connection.clone();

        let info: InfoDict = self
            .bounded(redis::cmd("INFO").query_async(&mut conn))
            .await?;

        Ok(RemoteInfo {
            used_memory_human: info.get("used_memory_human"),
            connected_clients: info.get("connected_clients"),
            total_commands_processed: info.get("total_commands_processed"),
        })
    }
}
