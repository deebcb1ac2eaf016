//! Result type aliases for Canopy.

use crate::CanopyError;

/// A specialized `Result` type for cache operations.
pub type CanopyResult<T> = Result<T, CanopyError>;

/// A boxed future returning a `CanopyResult`.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = CanopyResult<T>> + Send + 'a>>;
