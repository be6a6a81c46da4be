//! Cache domain - key derivation, remote boundary and reports

mod key;
mod remote;
mod report;

pub use key::{escape_glob, CacheKey, CacheParams, KeyDeriver, ParamValue, DEFAULT_KEY_PREFIX};
pub use remote::{RemoteError, RemoteInfo, RemoteStore};
pub use report::{
    CacheHealth, CacheStats, CacheStatus, InvalidationSummary, LocalStatus, RemoteStatus,
};

#[cfg(test)]
pub use remote::MockRemoteStore;
#[cfg(test)]
pub use remote::mock::FakeRemoteStore;
