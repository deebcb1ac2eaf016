//! Configuration validation module.
//!
//! Validates configuration values up front, failing fast rather than at
//! the first cache call.

use crate::AppConfig;
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Pool size configuration is invalid.
    InvalidPoolSize { value: usize, maximum: usize },
    /// Timeout value must be positive.
    NonPositiveTimeout { name: String },
    /// Key prefix cannot be empty.
    EmptyKeyPrefix,
    /// A cache profile declares a zero TTL.
    NonPositiveTtl { class: String },
    /// A cache profile declares an empty prefix override.
    EmptyProfilePrefix { class: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::InvalidPoolSize { value, maximum } => {
                write!(f, "Pool size {} exceeds maximum allowed ({})", value, maximum)
            }
            Self::NonPositiveTimeout { name } => {
                write!(f, "Timeout '{}' must be positive", name)
            }
            Self::EmptyKeyPrefix => write!(f, "cache.key_prefix cannot be empty"),
            Self::NonPositiveTtl { class } => {
                write!(f, "Cache profile '{}' declares ttl_secs = 0 (TTL must be positive)", class)
            }
            Self::EmptyProfilePrefix { class } => {
                write!(f, "Cache profile '{}' declares an empty prefix override", class)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: usize = 1000;

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_redis(&config.redis, &mut errors);
        Self::validate_cache(&config.cache, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validates Redis configuration.
    fn validate_redis(config: &crate::RedisConfig, errors: &mut Vec<ConfigValidationError>) {
        if !config.url.starts_with("redis://") && !config.url.starts_with("rediss://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            });
        } else if Url::parse(&config.url).is_err() {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: format!("Invalid URL format: {}", config.url),
            });
        }

        if config.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::InvalidPoolSize {
                value: config.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }

        if config.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "redis.connect_timeout_secs".to_string(),
            });
        }
    }

    /// Validates cache settings and per-class profiles.
    fn validate_cache(config: &crate::CacheSettings, errors: &mut Vec<ConfigValidationError>) {
        if config.key_prefix.is_empty() {
            errors.push(ConfigValidationError::EmptyKeyPrefix);
        }

        for (class, profile) in &config.profiles {
            if profile.ttl_secs == Some(0) {
                errors.push(ConfigValidationError::NonPositiveTtl {
                    class: class.clone(),
                });
            }
            if profile.prefix.as_deref() == Some("") {
                errors.push(ConfigValidationError::EmptyProfilePrefix {
                    class: class.clone(),
                });
            }
        }
    }
}

/// Formats validation errors for display.
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    let mut output = String::from("Configuration validation failed:\n");
    for (i, error) in errors.iter().enumerate() {
        output.push_str(&format!("  {}. {}\n", i + 1, error));
    }
    output
}
