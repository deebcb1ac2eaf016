//! Redis-backed store implementation.

use crate::store::CacheStore;
use async_trait::async_trait;
use canopy_config::RedisConfig;
use canopy_core::{CanopyError, CanopyResult};
use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};
use shaku::Component;
use std::time::Duration;
use tracing::{debug, info};

/// Create a Redis connection pool and verify connectivity with a PING.
pub async fn create_pool(config: &RedisConfig) -> CanopyResult<Pool> {
    info!("Creating Redis connection pool...");

    let cfg = Config::from_url(&config.url);

    let pool = cfg
        .builder()
        .map_err(|e| CanopyError::configuration(format!("Invalid Redis config: {}", e)))?
        .max_size(config.pool_size)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| CanopyError::configuration(format!("Failed to create pool: {}", e)))?;

    let mut conn = pool.get().await?;
    redis::cmd("PING").query_async::<String>(&mut *conn).await?;

    info!("Redis connection pool created successfully");

    Ok(pool)
}

/// Redis store component.
///
/// Without a pool the store is disabled: every read misses and every
/// write is a no-op, so the surrounding application keeps working
/// against the remote API alone.
#[derive(Component)]
#[shaku(interface = CacheStore)]
pub struct RedisStore {
    /// Redis connection pool.
    pool: Option<Pool>,
}

impl RedisStore {
    /// Create a new Redis store over an existing pool.
    #[must_use]
    pub fn new(pool: Pool) -> Self {
        Self { pool: Some(pool) }
    }

    /// Create a no-op store (for when Redis is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    /// Whether a backing pool is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    /// Get a connection from the pool.
    async fn conn(&self) -> CanopyResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => Ok(pool.get().await?),
            None => Err(CanopyError::store("Cache is disabled")),
        }
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> CanopyResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.conn().await?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| CanopyError::store(format!("Failed to get key '{}': {}", key, e)))?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CanopyResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.conn().await?;
        let ttl_secs = ttl.as_secs().max(1);

        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| CanopyError::store(format!("Failed to set key '{}': {}", key, e)))?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }

    async fn del(&self, keys: &[String]) -> CanopyResult<u64> {
        if keys.is_empty() || !self.is_enabled() {
            return Ok(0);
        }

        let mut conn = self.conn().await?;
        let deleted: i64 = conn
            .del(keys)
            .await
            .map_err(|e| CanopyError::store(format!("Failed to delete {} keys: {}", keys.len(), e)))?;

        debug!("Deleted {} of {} keys", deleted, keys.len());
        Ok(deleted as u64)
    }

    async fn smembers(&self, key: &str) -> CanopyResult<Vec<String>> {
        if !self.is_enabled() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn().await?;
        let members: Vec<String> = conn
            .smembers(key)
            .await
            .map_err(|e| CanopyError::store(format!("Failed to read set '{}': {}", key, e)))?;

        Ok(members)
    }

    async fn sadd(&self, key: &str, member: &str) -> CanopyResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.conn().await?;
        conn.sadd::<_, _, ()>(key, member)
            .await
            .map_err(|e| CanopyError::store(format!("Failed to add to set '{}': {}", key, e)))?;

        Ok(())
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}
