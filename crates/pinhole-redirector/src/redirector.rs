use crate::Result;
use async_trait::async_trait;
use pinhole_core::{ShortCode, UrlRecord};

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a short code to its stored URL record.
    /// Fails with `NotFound` if the code does not exist.
    async fn resolve(&self, code: &ShortCode) -> Result<UrlRecord>;
}
