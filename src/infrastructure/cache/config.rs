//! Cache configuration

use std::time::Duration;

use serde::Deserialize;

use crate::domain::cache::DEFAULT_KEY_PREFIX;
use crate::domain::CacheError;

/// Configuration for the two-tier cache
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CacheConfig {
    /// Remote cache URL (e.g., "redis://127.0.0.1:6379"); absent means local-only
    #[serde(default)]
    pub remote_url: Option<String>,
    /// Prefix tagging every key the cache owns
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// TTL applied when a caller does not pass one
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Upper bound on local tier entries
    #[serde(default = "default_local_max_capacity")]
    pub local_max_capacity: u64,
}

fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

fn default_ttl_secs() -> u64 {
    300
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_local_max_capacity() -> u64 {
    10_000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            key_prefix: default_key_prefix(),
            default_ttl_secs: default_ttl_secs(),
            connect_timeout_secs: default_timeout_secs(),
            read_timeout_secs: default_timeout_secs(),
            local_max_capacity: default_local_max_capacity(),
        }
    }
}

impl CacheConfig {
    /// Creates a configuration with no remote tier
    pub fn local_only() -> Self {
        Self::default()
    }

    /// Creates a configuration backed by the given remote URL
    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            remote_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Sets the key prefix
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Sets the default TTL in seconds
    pub fn with_default_ttl_secs(mut self, secs: u64) -> Self {
        self.default_ttl_secs = secs;
        self
    }

    /// Sets the local tier capacity
    pub fn with_local_max_capacity(mut self, capacity: u64) -> Self {
        self.local_max_capacity = capacity;
        self
    }

    /// Sets both remote timeouts
    pub fn with_timeouts(mut self, connect: Duration, read: Duration) -> Self {
        self.connect_timeout_secs = connect.as_secs();
        self.read_timeout_secs = read.as_secs();
        self
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Applies overrides from process environment variables
    pub fn apply_env_overrides(&mut self) -> Result<(), CacheError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from a variable lookup
    ///
    /// Recognized variables: `REMOTE_CACHE_URL`, `REMOTE_CACHE_CONNECT_TIMEOUT_SECS`,
    /// `REMOTE_CACHE_READ_TIMEOUT_SECS`, `CACHE_DEFAULT_TTL_SECS`,
    /// `CACHE_KEY_PREFIX`, `LOCAL_CACHE_MAX_CAPACITY`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), CacheError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("REMOTE_CACHE_URL") {
            self.remote_url = Some(url);
        }

        if let Some(prefix) = lookup("CACHE_KEY_PREFIX") {
            self.key_prefix = prefix;
        }

        let numeric = |name: &str| -> Result<Option<u64>, CacheError> {
            lookup(name)
                .map(|raw| {
                    raw.trim().parse::<u64>().map_err(|_| {
                        CacheError::configuration(format!(
                            "{} must be a non-negative integer, got '{}'",
                            name, raw
                        ))
                    })
                })
                .transpose()
        };

        if let Some(secs) = numeric("REMOTE_CACHE_CONNECT_TIMEOUT_SECS")? {
            self.connect_timeout_secs = secs;
        }
        if let Some(secs) = numeric("REMOTE_CACHE_READ_TIMEOUT_SECS")? {
            self.read_timeout_secs = secs;
        }
        if let Some(secs) = numeric("CACHE_DEFAULT_TTL_SECS")? {
            self.default_ttl_secs = secs;
        }
        if let Some(capacity) = numeric("LOCAL_CACHE_MAX_CAPACITY")? {
            self.local_max_capacity = capacity;
        }

        self.normalize();
        Ok(())
    }

    /// Blank remote URLs count as absent
    fn normalize(&mut self) {
        if self.remote_url.as_deref().is_some_and(|url| url.trim().is_empty()) {
            self.remote_url = None;
        }
    }

    /// Validates configured values
    pub fn validate(&self) -> Result<(), CacheError> {
        if self.key_prefix.is_empty() {
            return Err(CacheError::configuration("Cache key prefix must not be empty"));
        }
        if self.default_ttl_secs == 0 {
            return Err(CacheError::configuration("Default TTL must be positive"));
        }
        if self.local_max_capacity == 0 {
            return Err(CacheError::configuration(
                "Local cache capacity must be positive",
            ));
        }
        if self.remote_url.is_some() && (self.connect_timeout_secs == 0 || self.read_timeout_secs == 0)
        {
            return Err(CacheError::configuration(
                "Remote cache timeouts must be positive",
            ));
        }
        Ok(())
    }

    /// Whether a remote tier is configured
    pub fn remote_configured(&self) -> bool {
        self.remote_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }
}
