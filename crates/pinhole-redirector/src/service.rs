use std::sync::Arc;
use std::time::Duration;

use crate::error::RedirectorError;
use crate::redirector::Redirector;
use async_trait::async_trait;
use pinhole_core::{Repository, ShortCode, UrlRecord};
use tokio::sync::Semaphore;
use tracing::{debug, trace, warn};
use typed_builder::TypedBuilder;

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_PENDING_HITS: usize = 1024;

/// Tunables for [`RedirectorService`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct RedirectorSettings {
    /// Upper bound on a single lookup.
    #[builder(default = DEFAULT_DEADLINE)]
    pub deadline: Duration,
    /// Count successful resolves in the background.
    #[builder(default = true)]
    pub track_hits: bool,
    /// Hit increments allowed in flight before further hits are dropped.
    #[builder(default = DEFAULT_MAX_PENDING_HITS)]
    pub max_pending_hits: usize,
}

impl Default for RedirectorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Service for handling URL redirects.
///
/// Lookups go through the given repository, which may be a
/// [`CachedRepository`](crate::CachedRepository). Hit counting never delays
/// or fails a resolve.
#[derive(Debug, Clone)]
pub struct RedirectorService<R> {
    repository: Arc<R>,
    settings: RedirectorSettings,
    hit_permits: Arc<Semaphore>,
}

impl<R: Repository> RedirectorService<R> {
    /// Creates a new RedirectorService with default settings.
    pub fn new(repository: Arc<R>) -> Self {
        Self::with_settings(repository, RedirectorSettings::default())
    }

    pub fn with_settings(repository: Arc<R>, settings: RedirectorSettings) -> Self {
        let hit_permits = Arc::new(Semaphore::new(settings.max_pending_hits));
        Self {
            repository,
            settings,
            hit_permits,
        }
    }

    /// Returns the shared repository.
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn settings(&self) -> &RedirectorSettings {
        &self.settings
    }

    fn record_hit(&self, code: &ShortCode) {
        let Ok(permit) = Arc::clone(&self.hit_permits).try_acquire_owned() else {
            warn!(code = %code, "too many pending hit updates, dropping hit");
            return;
        };

        let repository = Arc::clone(&self.repository);
        let code = code.clone();
        tokio::spawn(async move {
            let _permit = permit;
            if let Err(e) = repository.increment_hits(&code).await {
                warn!(code = %code, error = %e, "failed to record hit");
            }
        });
    }
}

#[async_trait]
impl<R: Repository> Redirector for RedirectorService<R> {
    async fn resolve(&self, code: &ShortCode) -> crate::Result<UrlRecord> {
        trace!(code = %code, "resolving short code");

        let lookup = tokio::time::timeout(self.settings.deadline, self.repository.get(code)).await;
        let record = match lookup {
            Ok(found) => found?,
            Err(_) => {
                warn!(code = %code, deadline = ?self.settings.deadline, "resolve timed out");
                return Err(RedirectorError::Timeout(self.settings.deadline));
            }
        };

        let Some(record) = record else {
            trace!(code = %code, "short code not found");
            return Err(RedirectorError::NotFound(code.clone()));
        };

        debug!(code = %code, url = %record.original_url, "resolved short code");
        if self.settings.track_hits {
            self.record_hit(code);
        }
        Ok(record)
    }
}
