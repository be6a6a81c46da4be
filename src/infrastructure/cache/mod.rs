//! Cache infrastructure - remote adapter, local store and the manager

mod config;
mod local;
mod manager;
mod redis;

pub use config::CacheConfig;
pub use local::{LocalStore, LocalStoreConfig};
pub use manager::{cache_control_value, CacheManager, RemoteTier};
pub use redis::{RedisRemoteConfig, RedisRemoteStore};
