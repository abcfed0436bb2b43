use crate::error::ShortenerError;
use async_trait::async_trait;
use pinhole_core::{ShortCode, UrlRecord};

type Result<T> = std::result::Result<T, ShortenerError>;

/// A committed mapping returned by [`Shortener::shorten`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortened {
    pub code: ShortCode,
    pub record: UrlRecord,
    /// `true` when an existing mapping for the same URL was returned.
    pub reused: bool,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates (or reuses) a mapping for `original_url`.
    ///
    /// The mapping is durably committed before this returns `Ok`.
    async fn shorten(&self, original_url: &str) -> Result<Shortened>;
}
