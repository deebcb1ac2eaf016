//! Application configuration structures.

use canopy_core::TelemetryConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// Redis configuration.
    #[serde(default)]
    pub redis: RedisConfig,

    /// Cache behavior configuration.
    #[serde(default)]
    pub cache: CacheSettings,

    /// Telemetry configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppMetadata::default(),
            redis: RedisConfig::default(),
            cache: CacheSettings::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "canopy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Redis connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis URL.
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            pool_size: default_pool_size(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_pool_size() -> usize {
    10
}

fn default_connect_timeout() -> u64 {
    5
}

/// Cache behavior configuration.
///
/// `key_prefix` namespaces every Canopy key in the store. Entity-class
/// profiles configure the per-class TTL; a profile without a TTL is only
/// valid for a collection that inherits from its model class at
/// construction time, so no default is applied here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Prefix for all cache keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Per-entity-class cache profiles, keyed by entity class name.
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            key_prefix: default_key_prefix(),
            profiles: HashMap::new(),
        }
    }
}

fn default_key_prefix() -> String {
    "canopy".to_string()
}

/// Cache profile for one entity class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Key prefix override for this class. Falls back to the class name.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Entry TTL in seconds. Required for model classes; collections may
    /// omit it and inherit from the associated model class.
    #[serde(default)]
    pub ttl_secs: Option<u64>,
}
