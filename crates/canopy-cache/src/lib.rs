//! # Canopy Cache
//!
//! Read-through cache layer for remote API clients, backed by Redis.
//!
//! Cache entries are scoped per user and per entity class, keyed by a
//! canonical fingerprint of the request parameters, and expire on a
//! per-class TTL. Writes bust the cache through auxiliary index sets that
//! track every fingerprint ever cached for an entity, so invalidation
//! never needs a key-pattern scan against the store (which keeps it
//! compatible with sharded/proxied Redis deployments).
//!
//! The orchestration entry point is [`CacheDispatcher`]: reads flow
//! through [`ReadThroughCache`], mutations invalidate via [`Invalidator`]
//! before the underlying operation is allowed to run.

pub mod dispatcher;
pub mod fingerprint;
pub mod invalidation;
pub mod keys;
pub mod memory;
pub mod namespace;
pub mod read_through;
pub mod redis_store;
pub mod store;

pub use dispatcher::{CacheDispatcher, Operation};
pub use fingerprint::{RequestFingerprint, RequestParams};
pub use invalidation::{IndexTarget, Invalidator};
pub use keys::KeyBuilder;
pub use memory::MemoryStore;
pub use namespace::{CacheNamespace, CacheProfile, EntityKey};
pub use read_through::ReadThroughCache;
pub use redis_store::{create_pool, RedisStore};
pub use store::CacheStore;
