//! Introspection reports returned by the cache manager

use serde::{Deserialize, Serialize};

/// Overall cache status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Healthy,
    Degraded,
}

/// State of the remote tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStatus {
    Connected,
    /// Configured, but no connection could be established at startup
    Disconnected,
    /// Connected at startup, but currently failing
    Error,
    NotConfigured,
}

/// State of the local tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocalStatus {
    Active,
}

/// Health report
///
/// `Degraded` means the remote tier was configured but is not serving.
/// Running local-only by configuration is healthy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheHealth {
    pub cache_status: CacheStatus,
    pub remote_status: RemoteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
    pub local_status: LocalStatus,
}

/// Statistics report; remote failures are captured in `remote_error`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub remote_configured: bool,
    pub remote_connected: bool,
    pub local_entry_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_used_memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_connected_clients: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_total_commands_processed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
}

/// Outcome of a bulk invalidation across both tiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationSummary {
    /// Keys removed remotely; `None` when the remote tier was skipped or failed
    pub remote_deleted: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_error: Option<String>,
    pub local_deleted: u64,
}
