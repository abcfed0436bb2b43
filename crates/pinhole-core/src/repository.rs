use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored URL mapping.
///
/// The original URL and creation time never change once a record has been
/// written; only `hit_count` is mutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The original URL that was shortened.
    pub original_url: String,
    /// When the mapping was created.
    pub created_at: Timestamp,
    /// Number of successful resolves observed so far.
    pub hit_count: u64,
}

impl UrlRecord {
    /// Creates a fresh record stamped with the current time.
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: original_url.into(),
            created_at: Timestamp::now(),
            hit_count: 0,
        }
    }
}

/// A read-only view of a repository.
///
/// This trait provides only the read operations from [`Repository`],
/// allowing decorators such as caches to wrap the lookup path alone.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the URL record for a given short code.
    /// Returns `None` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>>;

    /// Checks whether a short code already exists in the repository.
    async fn exists(&self, code: &ShortCode) -> Result<bool>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Atomically inserts `record` under `code` if the code is unused.
    ///
    /// Returns `true` if this call inserted the record and `false` if the
    /// code was already taken. At most one concurrent caller observes `true`
    /// for a given code.
    async fn put_if_absent(&self, code: &ShortCode, record: UrlRecord) -> Result<bool>;

    /// Looks up an existing code for an original URL.
    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortCode>>;

    /// Increments the hit counter for `code`. Unknown codes are ignored.
    async fn increment_hits(&self, code: &ShortCode) -> Result<()>;
}
