use crate::cache::UrlCache;
use crate::error::{CacheError, Result};
use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::EvictionPolicy;
use pinhole_core::{ShortCode, UrlRecord};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

pub const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Outcome of a single-flight fill that must not be cached.
#[derive(Debug, Clone)]
enum Miss {
    NotFound,
    Failed(CacheError),
}

/// A bounded in-memory cache implementation using Moka.
///
/// Entries are evicted least-recently-used first once `max_capacity` is
/// reached, and optionally after sitting idle. Lookups that find nothing
/// are not stored, so a code created after a failed lookup becomes
/// visible immediately.
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<ShortCode, UrlRecord>,
}

impl MokaUrlCache {
    /// Creates a new Moka URL cache holding up to 10,000 entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }

    /// Creates a new Moka URL cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        CacheConfig::builder().max_capacity(max_capacity).build().into()
    }

    /// Returns a builder for creating a custom cache configuration.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfig::builder()
    }

    /// Approximate number of cached entries.
    ///
    /// Moka applies evictions lazily; call [`MokaUrlCache::sync`] first for
    /// an exact figure.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs pending maintenance (evictions, expirations) immediately.
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        match self.cache.get(code).await {
            Some(record) => {
                trace!(code = %code, "cache hit");
                Ok(Some(record))
            }
            None => {
                trace!(code = %code, "cache miss");
                Ok(None)
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, record: &UrlRecord) -> Result<()> {
        self.cache.insert(code.clone(), record.clone()).await;
        trace!(code = %code, "cached record");
        Ok(())
    }

    async fn get_or_compute<F, Fut>(&self, code: &ShortCode, fetch: F) -> Result<Option<UrlRecord>>
    where
        F: FnOnce(&ShortCode) -> Fut + Send,
        Fut: Future<Output = Result<Option<UrlRecord>>> + Send,
    {
        // try_get_with coalesces concurrent fills for the same key and never
        // stores the error side, which is how misses stay uncached
        let result = self
            .cache
            .try_get_with(code.clone(), async {
                trace!(code = %code, "cache miss, filling from loader");
                match fetch(code).await {
                    Ok(Some(record)) => Ok(record),
                    Ok(None) => Err(Miss::NotFound),
                    Err(e) => Err(Miss::Failed(e)),
                }
            })
            .await;

        match result {
            Ok(record) => Ok(Some(record)),
            Err(miss) => match miss.as_ref() {
                Miss::NotFound => {
                    debug!(code = %code, "loader found no record");
                    Ok(None)
                }
                Miss::Failed(e) => Err(e.clone()),
            },
        }
    }
}

/// Configuration for creating a MokaUrlCache with custom settings.
#[derive(Debug, TypedBuilder)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold.
    #[builder(default = DEFAULT_MAX_CAPACITY)]
    max_capacity: u64,
    /// Evict entries that have not been read for this long.
    #[builder(default, setter(strip_option))]
    tti: Option<Duration>,
}

impl From<CacheConfig> for MokaUrlCache {
    fn from(config: CacheConfig) -> Self {
        let mut builder = Cache::builder()
            .max_capacity(config.max_capacity)
            .eviction_policy(EvictionPolicy::lru());

        if let Some(tti) = config.tti {
            builder = builder.time_to_idle(tti);
        }

        MokaUrlCache {
            cache: builder.build(),
        }
    }
}
