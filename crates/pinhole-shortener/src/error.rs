use pinhole_core::StorageError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("no unique short code found after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("shorten deadline of {0:?} exceeded")]
    Timeout(Duration),
}

impl ShortenerError {
    /// Whether the caller may retry the same request unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            ShortenerError::InvalidUrl(_) => false,
            ShortenerError::GenerationExhausted { .. } | ShortenerError::Timeout(_) => true,
            ShortenerError::Storage(e) => e.is_transient(),
        }
    }
}
