//! Cache namespaces, entity keys, and per-class cache profiles.
//!
//! A [`CacheNamespace`] scopes every key to one user and one entity class
//! so that cached responses can never leak across users. It is validated
//! at construction and immutable afterwards; nothing is inherited lazily
//! from surrounding state.

use canopy_config::CacheSettings;
use canopy_core::{CanopyError, CanopyResult};
use std::time::Duration;

/// Namespace scoping all cache keys to one user and one entity class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNamespace {
    prefix: String,
    user: String,
    entity_class: String,
}

impl CacheNamespace {
    /// Creates a validated namespace.
    ///
    /// All three fields are required; an empty field is a configuration
    /// error surfaced immediately rather than at the first cache call.
    pub fn new(
        prefix: impl Into<String>,
        user: impl Into<String>,
        entity_class: impl Into<String>,
    ) -> CanopyResult<Self> {
        let prefix = prefix.into();
        let user = user.into();
        let entity_class = entity_class.into();

        if prefix.is_empty() {
            return Err(CanopyError::configuration("cache key prefix is required"));
        }
        if user.is_empty() {
            return Err(CanopyError::configuration(
                "user identifier is required (cache keys are namespaced per user)",
            ));
        }
        if entity_class.is_empty() {
            return Err(CanopyError::configuration("entity class is required"));
        }

        Ok(Self {
            prefix,
            user,
            entity_class,
        })
    }

    /// The fixed key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The user identifier this namespace is scoped to.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The entity-class tag (e.g. `comment`).
    #[must_use]
    pub fn entity_class(&self) -> &str {
        &self.entity_class
    }
}

/// Identifies one entity instance within a namespace.
///
/// A model without an id (not yet created) cannot be cache-busted
/// individually; it only participates in the shared collection index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKey {
    /// A single entity, optionally identified.
    Model { id: Option<String> },
    /// A collection of entities, keyed only by request fingerprint.
    Collection,
}

impl EntityKey {
    /// An identified model.
    #[must_use]
    pub fn model(id: impl Into<String>) -> Self {
        Self::Model { id: Some(id.into()) }
    }

    /// A model with no id yet (pre-create).
    #[must_use]
    pub const fn unsaved_model() -> Self {
        Self::Model { id: None }
    }

    /// A collection.
    #[must_use]
    pub const fn collection() -> Self {
        Self::Collection
    }

    /// The model id, if any.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Model { id } => id.as_deref(),
            Self::Collection => None,
        }
    }

    /// Whether this key names a collection.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Collection)
    }
}

/// Cache settings for one entity class: key prefix and entry TTL.
///
/// The TTL is required with no default. A collection class may leave
/// either field unset in configuration and resolve it from the
/// associated model class here, at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheProfile {
    prefix: String,
    ttl: Duration,
}

impl CacheProfile {
    /// Creates a validated profile.
    pub fn new(prefix: impl Into<String>, ttl: Duration) -> CanopyResult<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(CanopyError::configuration("cache profile prefix is required"));
        }
        if ttl.is_zero() {
            return Err(CanopyError::configuration(
                "cache TTL is required and must be positive (no default is applied)",
            ));
        }
        Ok(Self { prefix, ttl })
    }

    /// Builds the profile for an entity class from loaded settings.
    ///
    /// The prefix falls back to the class name; the TTL never falls back.
    pub fn from_settings(class: &str, settings: &CacheSettings) -> CanopyResult<Self> {
        let profile = settings.profiles.get(class).ok_or_else(|| {
            CanopyError::configuration(format!("no cache profile configured for '{}'", class))
        })?;

        let prefix = profile
            .prefix
            .clone()
            .unwrap_or_else(|| class.to_string());
        let ttl_secs = profile.ttl_secs.ok_or_else(|| {
            CanopyError::configuration(format!(
                "cache profile '{}' has no ttl_secs (TTL is required, no default)",
                class
            ))
        })?;

        Self::new(prefix, Duration::from_secs(ttl_secs))
    }

    /// Builds a collection profile, resolving unset fields from the
    /// associated model profile.
    pub fn for_collection(
        prefix: Option<String>,
        ttl: Option<Duration>,
        model: &CacheProfile,
    ) -> CanopyResult<Self> {
        Self::new(
            prefix.unwrap_or_else(|| model.prefix.clone()),
            ttl.unwrap_or(model.ttl),
        )
    }

    /// The entity-class key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The entry TTL.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }
}
