use pinhole_core::StorageError;
use thiserror::Error;

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    /// The loader behind a read-through lookup failed.
    #[error("cache fill failed: {0}")]
    Fetch(#[from] StorageError),
}
