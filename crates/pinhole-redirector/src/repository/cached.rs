use async_trait::async_trait;
use pinhole_cache::{CacheError, UrlCache};
use pinhole_core::repository::Result;
use pinhole_core::{ReadRepository, Repository, ShortCode, UrlRecord};
use tracing::{debug, trace, warn};

/// A repository decorator that adds read-through caching.
///
/// This implementation composes any [`Repository`] with any [`UrlCache`]
/// implementation. Reads check the cache first, falling back to the inner
/// repository, and found records are cached on the way back. Writes go
/// straight to the inner repository; a successful `put_if_absent` also
/// warms the cache. Mappings never change after creation, so cached
/// entries need no invalidation. The `hit_count` of a cached record is a
/// snapshot taken when it was cached.
#[derive(Debug, Clone)]
pub struct CachedRepository<R, C> {
    inner: R,
    cache: C,
}

impl<R: Repository, C: UrlCache> CachedRepository<R, C> {
    /// Creates a new cached repository decorator.
    pub fn new(inner: R, cache: C) -> Self {
        Self { inner, cache }
    }

    /// Returns a reference to the inner repository.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Returns a reference to the cache.
    pub fn cache(&self) -> &C {
        &self.cache
    }
}

#[async_trait]
impl<R: Repository, C: UrlCache> ReadRepository for CachedRepository<R, C> {
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        trace!(code = %code, "fetching URL record with cache");

        // get_or_compute coalesces concurrent misses for the same key
        let cached = self
            .cache
            .get_or_compute(code, move |c| {
                let code = c.clone();
                async move {
                    trace!(code = %code, "cache miss, fetching from inner repository");
                    self.inner.get(&code).await.map_err(CacheError::from)
                }
            })
            .await;

        match cached {
            Ok(record) => Ok(record),
            Err(CacheError::Fetch(e)) => Err(e),
            Err(e) => {
                warn!(code = %code, error = %e, "cache error on lookup, falling back to inner repository");
                self.inner.get(code).await
            }
        }
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        match self.cache.get_url(code).await {
            Ok(Some(_)) => {
                debug!(code = %code, "cache hit indicates code exists");
                return Ok(true);
            }
            Ok(None) => {
                trace!(code = %code, "cache miss for existence check");
            }
            Err(e) => {
                warn!(code = %code, error = %e, "cache error on existence check, falling back to inner repository");
            }
        }

        self.inner.exists(code).await
    }
}

#[async_trait]
impl<R: Repository, C: UrlCache> Repository for CachedRepository<R, C> {
    async fn put_if_absent(&self, code: &ShortCode, record: UrlRecord) -> Result<bool> {
        let inserted = self.inner.put_if_absent(code, record.clone()).await?;

        if inserted {
            if let Err(e) = self.cache.set_url(code, &record).await {
                warn!(code = %code, error = %e, "failed to warm cache after insert");
            }
        }
        Ok(inserted)
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortCode>> {
        self.inner.find_by_url(original_url).await
    }

    async fn increment_hits(&self, code: &ShortCode) -> Result<()> {
        self.inner.increment_hits(code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinhole_cache::MokaUrlCache;
    use pinhole_core::StorageError;
    use pinhole_storage::InMemoryRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts lookups that reach the backing store.
    #[derive(Default)]
    struct CountingRepository {
        inner: InMemoryRepository,
        gets: AtomicUsize,
        fail: bool,
    }

    impl CountingRepository {
        fn gets(&self) -> usize {
            self.gets.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReadRepository for CountingRepository {
        async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StorageError::Unavailable("connection refused".to_string()));
            }
            self.inner.get(code).await
        }

        async fn exists(&self, code: &ShortCode) -> Result<bool> {
            self.inner.exists(code).await
        }
    }

    #[async_trait]
    impl Repository for CountingRepository {
        async fn put_if_absent(&self, code: &ShortCode, record: UrlRecord) -> Result<bool> {
            self.inner.put_if_absent(code, record).await
        }

        async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortCode>> {
            self.inner.find_by_url(original_url).await
        }

        async fn increment_hits(&self, code: &ShortCode) -> Result<()> {
            self.inner.increment_hits(code).await
        }
    }

    /// A cache whose every operation fails.
    struct DownCache;

    #[async_trait]
    impl UrlCache for DownCache {
        async fn get_url(&self, _code: &ShortCode) -> pinhole_cache::Result<Option<UrlRecord>> {
            Err(CacheError::Unavailable("cache offline".to_string()))
        }

        async fn set_url(&self, _code: &ShortCode, _record: &UrlRecord) -> pinhole_cache::Result<()> {
            Err(CacheError::Unavailable("cache offline".to_string()))
        }
    }

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn cached() -> CachedRepository<CountingRepository, MokaUrlCache> {
        CachedRepository::new(CountingRepository::default(), MokaUrlCache::new())
    }

    #[tokio::test]
    async fn get_from_inner_when_cache_miss() {
        let cached = cached();
        let c = code("abc123");
        let record = UrlRecord::new("https://example.com");

        cached.inner().put_if_absent(&c, record.clone()).await.unwrap();

        let result = cached.get(&c).await.unwrap();
        assert_eq!(result, Some(record.clone()));
        assert_eq!(cached.cache().get_url(&c).await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn repeated_gets_hit_inner_once() {
        let cached = cached();
        let c = code("abc123");
        cached
            .inner()
            .put_if_absent(&c, UrlRecord::new("https://example.com"))
            .await
            .unwrap();

        for _ in 0..5 {
            let result = cached.get(&c).await.unwrap().unwrap();
            assert_eq!(result.original_url, "https://example.com");
        }

        assert_eq!(cached.inner().gets(), 1);
    }

    #[tokio::test]
    async fn missing_code_is_not_cached() {
        let cached = cached();
        let c = code("late01");

        assert!(cached.get(&c).await.unwrap().is_none());

        cached
            .inner()
            .put_if_absent(&c, UrlRecord::new("https://example.com"))
            .await
            .unwrap();

        let result = cached.get(&c).await.unwrap().unwrap();
        assert_eq!(result.original_url, "https://example.com");
    }

    #[tokio::test]
    async fn put_if_absent_warms_cache() {
        let cached = cached();
        let c = code("warm01");
        let record = UrlRecord::new("https://example.com");

        assert!(cached.put_if_absent(&c, record.clone()).await.unwrap());
        assert_eq!(cached.cache().get_url(&c).await.unwrap(), Some(record));

        cached.get(&c).await.unwrap();
        assert_eq!(cached.inner().gets(), 0);
    }

    #[tokio::test]
    async fn failed_put_does_not_touch_cache() {
        let cached = cached();
        let c = code("taken1");

        assert!(cached
            .put_if_absent(&c, UrlRecord::new("https://first.example"))
            .await
            .unwrap());
        assert!(!cached
            .put_if_absent(&c, UrlRecord::new("https://second.example"))
            .await
            .unwrap());

        let result = cached.get(&c).await.unwrap().unwrap();
        assert_eq!(result.original_url, "https://first.example");
    }

    #[tokio::test]
    async fn storage_errors_propagate_unchanged() {
        let cached = CachedRepository::new(
            CountingRepository {
                fail: true,
                ..Default::default()
            },
            MokaUrlCache::new(),
        );

        let err = cached.get(&code("abc123")).await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }

    #[tokio::test]
    async fn broken_cache_falls_back_to_inner() {
        let cached = CachedRepository::new(CountingRepository::default(), DownCache);
        let c = code("abc123");

        assert!(cached
            .put_if_absent(&c, UrlRecord::new("https://example.com"))
            .await
            .unwrap());

        let result = cached.get(&c).await.unwrap().unwrap();
        assert_eq!(result.original_url, "https://example.com");
        assert!(cached.exists(&c).await.unwrap());
    }

    #[tokio::test]
    async fn exists_checks_inner_when_not_in_cache() {
        let cached = cached();
        let c = code("abc123");

        assert!(!cached.exists(&c).await.unwrap());

        cached
            .inner()
            .put_if_absent(&c, UrlRecord::new("https://example.com"))
            .await
            .unwrap();

        assert!(cached.exists(&c).await.unwrap());
    }
}
