//! Errors returned by the cache.

use thiserror::Error;

/// Errors produced by [`LfuCache`](crate::LfuCache) and
/// [`LfuSet`](crate::LfuSet).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// The cache was constructed with a capacity of zero. Capacity must be at
    /// least one.
    #[error("cache capacity must be at least 1")]
    InvalidCapacity,
    /// The requested key is not present in the cache. No state was modified.
    #[error("key not found in cache")]
    NotFound,
}

/// Convenience alias for results carrying an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
