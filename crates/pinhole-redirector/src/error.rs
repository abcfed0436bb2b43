use pinhole_core::{ShortCode, StorageError};
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RedirectorError>;

#[derive(Debug, Clone, Error)]
pub enum RedirectorError {
    #[error("short code not found: {0}")]
    NotFound(ShortCode),
    #[error("storage operation failed: {0}")]
    Storage(#[from] StorageError),
    #[error("resolve deadline of {0:?} exceeded")]
    Timeout(Duration),
}
