use crate::error::Result;
use async_trait::async_trait;
use pinhole_core::{ShortCode, UrlRecord};
use std::future::Future;

/// A cache for URL records.
///
/// This trait provides a domain-specific caching abstraction for [`UrlRecord`]s,
/// using [`ShortCode`] as the key. Records are immutable once created, so
/// implementations only need to evict, never to invalidate.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get URL record from cache.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Store URL record in cache.
    async fn set_url(&self, code: &ShortCode, record: &UrlRecord) -> Result<()>;

    /// Get URL record from cache, computing it if not present.
    ///
    /// Only found records are stored; a `None` from `fetch` is returned as is.
    async fn get_or_compute<F, Fut>(&self, code: &ShortCode, fetch: F) -> Result<Option<UrlRecord>>
    where
        F: FnOnce(&ShortCode) -> Fut + Send,
        Fut: Future<Output = Result<Option<UrlRecord>>> + Send,
    {
        match self.get_url(code).await? {
            Some(record) => Ok(Some(record)),
            None => {
                let record = fetch(code).await?;
                if let Some(ref value) = record {
                    self.set_url(code, value).await?;
                }
                Ok(record)
            }
        }
    }
}
