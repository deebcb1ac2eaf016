//! Store abstraction over the backing key-value store.

use canopy_core::CanopyResult;
use async_trait::async_trait;
use shaku::Interface;
use std::time::Duration;

/// The store operations the cache layer needs: plain GET/SET with TTL,
/// batch DEL, and set membership for the invalidation indices.
///
/// Values are JSON strings for type-erased storage, which keeps the trait
/// dyn-compatible. Implementations must not retry; retry policy belongs
/// to the store client or the caller.
#[async_trait]
pub trait CacheStore: Interface + Send + Sync {
    /// Get a raw value. Returns `None` if the key is absent or expired.
    async fn get(&self, key: &str) -> CanopyResult<Option<String>>;

    /// Set a raw value with a TTL.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CanopyResult<()>;

    /// Delete the given keys. Returns the number of keys deleted.
    /// An empty key list succeeds immediately without a store round trip.
    async fn del(&self, keys: &[String]) -> CanopyResult<u64>;

    /// All members of a set. Returns an empty list for an absent key.
    async fn smembers(&self, key: &str) -> CanopyResult<Vec<String>>;

    /// Add a member to a set, creating it if absent.
    async fn sadd(&self, key: &str, member: &str) -> CanopyResult<()>;
}
