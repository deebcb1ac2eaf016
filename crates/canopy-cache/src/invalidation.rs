//! Set-tracked cache invalidation.
//!
//! Every populated entry records its fingerprint in an index set, so a
//! write can resolve the set to concrete entry keys and batch-delete
//! them without scanning the store. The index targets for one entity are
//! processed in parallel; any failure fails the whole call, and the
//! caller must treat the invalidation as not guaranteed even though
//! sibling deletions may already have executed.

use crate::dispatcher::Operation;
use crate::keys::KeyBuilder;
use crate::namespace::EntityKey;
use crate::store::CacheStore;
use canopy_core::{CanopyError, CanopyResult};
use std::sync::Arc;
use tracing::{debug, info};

/// One index set to resolve and bust.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexTarget {
    /// The per-id model index.
    Model { id: String },
    /// The shared per-namespace collection index.
    Collection,
}

impl IndexTarget {
    fn index_key(&self, keys: &KeyBuilder) -> String {
        match self {
            Self::Model { id } => keys.model_index_key(id),
            Self::Collection => keys.collection_index_key(),
        }
    }

    fn entry_key(&self, keys: &KeyBuilder, fingerprint: &str) -> String {
        match self {
            Self::Model { id } => keys.model_entry_key(id, fingerprint),
            Self::Collection => keys.collection_entry_key(fingerprint),
        }
    }
}

/// Invalidation tracker over a [`CacheStore`].
pub struct Invalidator<S> {
    store: Arc<S>,
}

impl<S: CacheStore> Invalidator<S> {
    /// Creates an invalidator over the given store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The index targets to bust for an entity and operation.
    ///
    /// A create has no existing model to bust, so only the collection
    /// index is targeted; the same applies to a model with no id. The
    /// collection index is always targeted: any write to the class makes
    /// cached collection pages stale.
    #[must_use]
    pub fn targets_for(entity: &EntityKey, operation: Operation) -> Vec<IndexTarget> {
        let mut targets = Vec::with_capacity(2);

        if operation != Operation::Create {
            if let EntityKey::Model { id: Some(id) } = entity {
                targets.push(IndexTarget::Model { id: id.clone() });
            }
        }
        targets.push(IndexTarget::Collection);

        targets
    }

    /// Resolves each target's index set to entry keys and deletes them,
    /// along with the index set itself. Targets run in parallel; all must
    /// succeed. Returns the number of keys deleted.
    pub async fn invalidate(
        &self,
        keys: &KeyBuilder,
        targets: &[IndexTarget],
    ) -> CanopyResult<u64> {
        let deletions = targets.iter().map(|target| self.bust(keys, target));
        let deleted: u64 = futures::future::try_join_all(deletions).await?.iter().sum();

        info!(deleted, targets = targets.len(), "Cache invalidated");
        Ok(deleted)
    }

    async fn bust(&self, keys: &KeyBuilder, target: &IndexTarget) -> CanopyResult<u64> {
        let index_key = target.index_key(keys);

        let fingerprints = self.store.smembers(&index_key).await.map_err(|e| {
            CanopyError::invalidation(format!(
                "Failed to enumerate index set '{}': {}",
                index_key, e
            ))
        })?;

        if fingerprints.is_empty() {
            debug!(index = %index_key, "Index set empty, nothing to invalidate");
            return Ok(0);
        }

        let mut del_keys: Vec<String> = fingerprints
            .iter()
            .map(|fp| target.entry_key(keys, fp))
            .collect();
        // Drop the index set with its entries so stale fingerprints do
        // not accumulate; re-population re-adds them idempotently.
        del_keys.push(index_key.clone());

        let deleted = self.store.del(&del_keys).await.map_err(|e| {
            CanopyError::invalidation(format!(
                "Failed to delete entries for index '{}': {}",
                index_key, e
            ))
        })?;

        debug!(index = %index_key, deleted, "Busted index set");
        Ok(deleted)
    }
}

impl<S> Clone for Invalidator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}
