//! Remote store boundary

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// Failure talking to the remote backend
///
/// Every backend-specific error is translated into one of these variants at
/// the adapter boundary, so callers never see the backend's error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("Remote connection failed: {0}")]
    Connection(String),

    #[error("Remote call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Remote protocol error: {0}")]
    Protocol(String),

    #[error("Remote payload could not be decoded: {0}")]
    Decode(String),
}

/// Server metadata reported by the remote backend
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteInfo {
    pub used_memory_human: Option<String>,
    pub connected_clients: Option<u64>,
    pub total_commands_processed: Option<u64>,
}

/// Shared key/value store with native expiry
///
/// Keys are full cache keys (already prefixed); values are JSON text.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    async fn get(&self, key: &str) -> Result<Option<String>, RemoteError>;

    /// Writes a value that expires after `ttl` (whole seconds, at least one)
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RemoteError>;

    async fn delete(&self, key: &str) -> Result<bool, RemoteError>;

    /// Lists keys matching a glob pattern
    async fn list_keys(&self, pattern: &str) -> Result<Vec<String>, RemoteError>;

    async fn delete_many(&self, keys: &[String]) -> Result<usize, RemoteError>;

    async fn ping(&self) -> Result<(), RemoteError>;

    async fn info(&self) -> Result<RemoteInfo, RemoteError>;
}
