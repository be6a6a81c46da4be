use thiserror::Error;

/// Errors surfaced to cache callers
///
/// Remote backend failures are deliberately absent: they are absorbed by the
/// cache manager and only ever show up inside stats and health reports.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Local store failure: {message}")]
    LocalStoreFatal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl CacheError {
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    pub fn local_store(message: impl Into<String>) -> Self {
        Self::LocalStoreFatal {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_error() {
        let error = CacheError::invalid_parameter("TTL must be positive");
        assert_eq!(error.to_string(), "Invalid parameter: TTL must be positive");
    }

    #[test]
    fn test_local_store_error() {
        let error = CacheError::local_store("worker panicked");
        assert_eq!(error.to_string(), "Local store failure: worker panicked");
    }

    #[test]
    fn test_configuration_error() {
        let error = CacheError::configuration("bad capacity");
        assert_eq!(error.to_string(), "Configuration error: bad capacity");
    }
}
