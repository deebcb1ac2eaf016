//! Canonical request fingerprinting.
//!
//! Two requests with the same logical content must land on the same cache
//! entry regardless of how their parameter maps were built, so all object
//! keys are sorted recursively before hashing. The digest is SHA-256,
//! which comfortably clears the collision bar for cache keys; no salt is
//! involved, so fingerprints are stable across process restarts.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Parameters of one request against the remote API (headers + query
/// data), carried as JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams(Value);

impl RequestParams {
    /// Wraps a JSON value as request parameters.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// The underlying JSON value.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for RequestParams {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

/// Fixed-width digest over canonicalized request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestFingerprint(String);

impl RequestFingerprint {
    /// Fingerprints the given request parameters.
    #[must_use]
    pub fn of(params: &RequestParams) -> Self {
        // Canonicalize explicitly rather than relying on serde_json's map
        // ordering, which flips to insertion order when any dependency
        // enables the `preserve_order` feature.
        let canonical = sort_json_value(params.as_value());

        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_string(&canonical).unwrap_or_default().as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// The fingerprint as a hex string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sort JSON object keys recursively for consistent hashing.
///
/// Array order is preserved: element order is semantic there.
fn sort_json_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by_key(|(k, _)| *k);
            let sorted_map: serde_json::Map<String, Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_json_value(v)))
                .collect();
            Value::Object(sorted_map)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_json_value).collect()),
        _ => value.clone(),
    }
}
