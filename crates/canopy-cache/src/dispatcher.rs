//! Cache-aware request dispatch.

use crate::fingerprint::{RequestFingerprint, RequestParams};
use crate::invalidation::Invalidator;
use crate::keys::KeyBuilder;
use crate::namespace::{CacheNamespace, CacheProfile, EntityKey};
use crate::read_through::ReadThroughCache;
use crate::store::CacheStore;
use canopy_core::CanopyResult;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The operation kinds the dispatcher routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Whether this operation mutates the entity.
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        !matches!(self, Self::Read)
    }
}

/// Orchestration entry point for one cache namespace.
///
/// Reads flow through the read-through cache; mutations must complete
/// invalidation before the underlying operation runs. Invalidation
/// failure short-circuits and the mutation is never attempted: a write
/// that cannot confirm its cache bust must not leave possibly-stale
/// entries behind.
pub struct CacheDispatcher<S> {
    keys: KeyBuilder,
    ttl: Duration,
    cache: ReadThroughCache<S>,
    invalidator: Invalidator<S>,
}

impl<S: CacheStore> CacheDispatcher<S> {
    /// Creates a dispatcher for one namespace and profile.
    #[must_use]
    pub fn new(store: Arc<S>, namespace: &CacheNamespace, profile: &CacheProfile) -> Self {
        Self {
            keys: KeyBuilder::new(namespace),
            ttl: profile.ttl(),
            cache: ReadThroughCache::new(Arc::clone(&store)),
            invalidator: Invalidator::new(store),
        }
    }

    /// Convenience constructor that builds the namespace from its parts.
    pub fn for_user(
        store: Arc<S>,
        key_prefix: &str,
        user: &str,
        profile: &CacheProfile,
    ) -> CanopyResult<Self> {
        let namespace = CacheNamespace::new(key_prefix, user, profile.prefix())?;
        Ok(Self::new(store, &namespace, profile))
    }

    /// The key builder for this namespace.
    #[must_use]
    pub fn keys(&self) -> &KeyBuilder {
        &self.keys
    }

    /// Routes one operation.
    ///
    /// For reads, `fetch` is the authoritative remote read and runs only
    /// on a cache miss. For mutations, `fetch` is the underlying mutating
    /// call and runs only after invalidation succeeds.
    pub async fn handle<T, F, Fut>(
        &self,
        operation: Operation,
        entity: &EntityKey,
        params: &RequestParams,
        fetch: F,
    ) -> CanopyResult<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned + Send,
        F: FnOnce() -> Fut + Send,
        Fut: std::future::Future<Output = CanopyResult<T>> + Send,
    {
        match operation {
            Operation::Read => {
                let fingerprint = RequestFingerprint::of(params);
                let entry_key = self.keys.entry_key(entity, &fingerprint)?;
                let index_key = self.keys.index_key(entity)?;
                self.cache
                    .get(&entry_key, &index_key, &fingerprint, self.ttl, fetch)
                    .await
            }
            op => {
                debug!(?op, "Invalidating before mutation");
                let targets = Invalidator::<S>::targets_for(entity, op);
                self.invalidator.invalidate(&self.keys, &targets).await?;
                fetch().await
            }
        }
    }
}

impl<S> std::fmt::Debug for CacheDispatcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheDispatcher")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
