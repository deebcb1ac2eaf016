//! Read-through cache population.

use crate::fingerprint::RequestFingerprint;
use crate::store::CacheStore;
use canopy_core::CanopyResult;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Read-through layer over a [`CacheStore`].
///
/// On a miss the caller-supplied fetch produces the authoritative value,
/// which is stored with the namespace TTL and recorded in the entity's
/// index set for later invalidation. No lock is taken: concurrent misses
/// on the same key fetch in parallel and overwrite each other with the
/// same authoritative value.
pub struct ReadThroughCache<S> {
    store: Arc<S>,
}

impl<S: CacheStore> ReadThroughCache<S> {
    /// Creates a read-through layer over the given store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the cached value for `entry_key`, or fetches, stores, and
    /// indexes it.
    ///
    /// A fetch failure propagates untouched and nothing is written. A
    /// failed cache population after a successful fetch is non-fatal to
    /// the read but degrades future invalidation, so it is logged.
    pub async fn get<T, F, Fut>(
        &self,
        entry_key: &str,
        index_key: &str,
        fingerprint: &RequestFingerprint,
        ttl: Duration,
        fetch: F,
    ) -> CanopyResult<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Send,
        F: FnOnce() -> Fut + Send,
        Fut: std::future::Future<Output = CanopyResult<T>> + Send,
    {
        if let Some(json) = self.store.get(entry_key).await? {
            match serde_json::from_str::<T>(&json) {
                Ok(value) => {
                    debug!(key = %entry_key, "Cache hit");
                    return Ok(value);
                }
                Err(e) => {
                    // Undecodable entry, treat as a miss and refetch.
                    warn!(key = %entry_key, error = %e, "Discarding undecodable cache entry");
                }
            }
        }

        debug!(key = %entry_key, "Cache miss, fetching");
        let value = fetch().await?;

        match serde_json::to_string(&value) {
            Ok(json) => {
                if let Err(e) = self.store.set(entry_key, &json, ttl).await {
                    warn!(key = %entry_key, error = %e, "Failed to cache fetched value");
                } else if let Err(e) = self.store.sadd(index_key, fingerprint.as_str()).await {
                    // The entry is cached but untracked: it will expire on
                    // TTL but cannot be busted by invalidation.
                    warn!(
                        key = %index_key,
                        error = %e,
                        "Failed to record fingerprint in index set"
                    );
                }
            }
            Err(e) => {
                warn!(key = %entry_key, error = %e, "Failed to serialize value for caching");
            }
        }

        Ok(value)
    }
}

impl<S> Clone for ReadThroughCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}
