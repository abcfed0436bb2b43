use crate::error::ShortenerError;
use crate::shortener::{Shortened, Shortener};
use crate::validate::{validate_url, DEFAULT_MAX_URL_LENGTH};
use async_trait::async_trait;
use pinhole_core::{Repository, ShortCode, UrlRecord};
use pinhole_generator::Generator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

/// Tunables for [`ShortenerService`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    /// Candidate codes tried before giving up with `GenerationExhausted`.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
    /// Upper bound on the whole create operation, storage included.
    #[builder(default = DEFAULT_DEADLINE)]
    pub deadline: Duration,
    #[builder(default = DEFAULT_MAX_URL_LENGTH)]
    pub max_url_length: usize,
    /// Hand out the existing code when the URL was shortened before.
    #[builder(default = true)]
    pub reuse_existing: bool,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a `Generator` to handle:
/// - URL validation
/// - Reuse of an existing mapping for the same URL
/// - Code generation with collision retry
///
/// A code is only returned after `put_if_absent` reported that this call
/// committed it, so a short URL never points at an unwritten mapping.
#[derive(Debug)]
pub struct ShortenerService<R, G> {
    repository: Arc<R>,
    generator: G,
    settings: ShortenerSettings,
}

impl<R: Repository, G: Generator> ShortenerService<R, G> {
    /// Creates a new `ShortenerService` with default settings.
    pub fn new(repository: Arc<R>, generator: G) -> Self {
        Self::with_settings(repository, generator, ShortenerSettings::default())
    }

    pub fn with_settings(repository: Arc<R>, generator: G, settings: ShortenerSettings) -> Self {
        Self {
            repository,
            generator,
            settings,
        }
    }

    /// Returns the shared repository.
    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn settings(&self) -> &ShortenerSettings {
        &self.settings
    }

    async fn create(&self, original_url: String) -> Result<Shortened, ShortenerError> {
        if self.settings.reuse_existing {
            if let Some(existing) = self.existing_mapping(&original_url).await? {
                return Ok(existing);
            }
        }

        let record = UrlRecord::new(original_url);
        for attempt in 1..=self.settings.max_attempts {
            let code: ShortCode = self.generator.generate(&record.original_url).into();

            if self.repository.put_if_absent(&code, record.clone()).await? {
                info!(code = %code, attempt, "created short url");
                return Ok(Shortened {
                    code,
                    record,
                    reused: false,
                });
            }

            debug!(code = %code, attempt, "short code collision, retrying");
        }

        warn!(
            attempts = self.settings.max_attempts,
            "could not find a free short code"
        );
        Err(ShortenerError::GenerationExhausted {
            attempts: self.settings.max_attempts,
        })
    }

    async fn existing_mapping(
        &self,
        original_url: &str,
    ) -> Result<Option<Shortened>, ShortenerError> {
        let Some(code) = self.repository.find_by_url(original_url).await? else {
            return Ok(None);
        };

        Ok(self.repository.get(&code).await?.map(|record| {
            debug!(code = %code, "reusing existing short url");
            Shortened {
                code,
                record,
                reused: true,
            }
        }))
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Shortener for ShortenerService<R, G> {
    async fn shorten(&self, original_url: &str) -> Result<Shortened, ShortenerError> {
        let original_url = validate_url(original_url, self.settings.max_url_length)?;

        match tokio::time::timeout(self.settings.deadline, self.create(original_url)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(deadline = ?self.settings.deadline, "shorten timed out");
                Err(ShortenerError::Timeout(self.settings.deadline))
            }
        }
    }
}
