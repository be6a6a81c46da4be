//! Domain layer - Cache keys, remote boundary and errors

pub mod cache;
pub mod error;

pub use cache::{
    CacheHealth, CacheKey, CacheParams, CacheStats, CacheStatus, InvalidationSummary,
    KeyDeriver, ParamValue, RemoteError, RemoteStatus, RemoteStore,
};
pub use error::CacheError;
