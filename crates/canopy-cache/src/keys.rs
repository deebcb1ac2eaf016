//! Cache key derivation.
//!
//! Models are stored under `{prefix}:{user}-{class}-model-{id}-{fingerprint}`
//! and collections under `{prefix}:{user}-{class}-collection-{fingerprint}`.
//! Each family has a companion `hashes` set tracking the fingerprints ever
//! cached, so invalidation can enumerate concrete keys instead of running
//! a `KEYS` scan (which twemproxy-style proxies do not support).
//!
//! The collection index is one set per namespace: collections have no id,
//! so all cached collection pages for a user/class share the same index
//! and are busted together.

use crate::fingerprint::RequestFingerprint;
use crate::namespace::{CacheNamespace, EntityKey};
use canopy_core::{CanopyError, CanopyResult};

/// Key builder for one cache namespace.
///
/// The namespace base is precomputed once; every derived key starts with
/// `{prefix}:{user}-{class}`.
#[derive(Debug, Clone)]
pub struct KeyBuilder {
    base: String,
}

impl KeyBuilder {
    /// Creates a key builder for the given namespace.
    #[must_use]
    pub fn new(namespace: &CacheNamespace) -> Self {
        Self {
            base: format!(
                "{}:{}-{}",
                namespace.prefix(),
                namespace.user(),
                namespace.entity_class()
            ),
        }
    }

    /// Entry key for a model cached under one fingerprint.
    #[must_use]
    pub fn model_entry_key(&self, id: &str, fingerprint: &str) -> String {
        format!("{}-model-{}-{}", self.base, id, fingerprint)
    }

    /// Index set key tracking fingerprints cached for one model.
    #[must_use]
    pub fn model_index_key(&self, id: &str) -> String {
        format!("{}-hashes-model-{}", self.base, id)
    }

    /// Entry key for a collection cached under one fingerprint.
    #[must_use]
    pub fn collection_entry_key(&self, fingerprint: &str) -> String {
        format!("{}-collection-{}", self.base, fingerprint)
    }

    /// Index set key tracking fingerprints cached for all collections in
    /// this namespace.
    #[must_use]
    pub fn collection_index_key(&self) -> String {
        format!("{}-hashes-collection", self.base)
    }

    /// Derives the entry key for an entity and fingerprint.
    ///
    /// A model without an id has no entry key; reading one is a usage
    /// error surfaced as a configuration failure.
    pub fn entry_key(
        &self,
        entity: &EntityKey,
        fingerprint: &RequestFingerprint,
    ) -> CanopyResult<String> {
        match entity {
            EntityKey::Model { id: Some(id) } => {
                Ok(self.model_entry_key(id, fingerprint.as_str()))
            }
            EntityKey::Model { id: None } => Err(CanopyError::configuration(
                "cannot derive an entry key for a model without an id",
            )),
            EntityKey::Collection => Ok(self.collection_entry_key(fingerprint.as_str())),
        }
    }

    /// Derives the index key for an entity.
    pub fn index_key(&self, entity: &EntityKey) -> CanopyResult<String> {
        match entity {
            EntityKey::Model { id: Some(id) } => Ok(self.model_index_key(id)),
            EntityKey::Model { id: None } => Err(CanopyError::configuration(
                "cannot derive an index key for a model without an id",
            )),
            EntityKey::Collection => Ok(self.collection_index_key()),
        }
    }
}
