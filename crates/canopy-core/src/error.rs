//! Unified error types for all layers of the cache.

use thiserror::Error;

/// Unified error type for Canopy.
///
/// Every failure the cache layer can surface maps onto one of these
/// variants. The propagation policy is strict: nothing is swallowed
/// silently, and invalidation failures must block the mutation that
/// triggered them.
#[derive(Error, Debug)]
pub enum CanopyError {
    /// Missing or invalid configuration (namespace fields, TTL, store
    /// settings). Fatal, surfaced immediately, never retried.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Backing store failure on any GET/SET/DEL/SMEMBERS/SADD.
    #[error("Store error: {0}")]
    Store(String),

    /// The authoritative fetch behind a cache miss failed. The cache is
    /// left untouched and the underlying error is surfaced verbatim.
    #[error("Fetch failed: {0}")]
    Fetch(#[source] anyhow::Error),

    /// Failure to enumerate or delete index members. For mutating
    /// operations this blocks the mutation from running.
    #[error("Invalidation error: {0}")]
    Invalidation(String),

    /// Cached payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CanopyError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Store(_) => "STORE_ERROR",
            Self::Fetch(_) => "FETCH_ERROR",
            Self::Invalidation(_) => "INVALIDATION_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration(message.into())
    }

    /// Creates a store error.
    #[must_use]
    pub fn store<T: Into<String>>(message: T) -> Self {
        Self::Store(message.into())
    }

    /// Creates a fetch error from any underlying failure.
    #[must_use]
    pub fn fetch<E: Into<anyhow::Error>>(err: E) -> Self {
        Self::Fetch(err.into())
    }

    /// Creates an invalidation error.
    #[must_use]
    pub fn invalidation<T: Into<String>>(message: T) -> Self {
        Self::Invalidation(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if this error is retriable by an outer layer.
    ///
    /// The cache itself never retries; this is a hint for callers.
    #[must_use]
    pub const fn is_retriable(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Invalidation(_))
    }

    /// Checks if this error blocks a mutating operation.
    #[must_use]
    pub const fn blocks_mutation(&self) -> bool {
        matches!(self, Self::Invalidation(_) | Self::Store(_))
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for CanopyError {
    fn from(err: redis::RedisError) -> Self {
        Self::Store(err.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<deadpool_redis::PoolError> for CanopyError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        Self::Store(format!("Failed to get Redis connection: {}", err))
    }
}
