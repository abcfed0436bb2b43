use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use pinhole_core::repository::Result;
use pinhole_core::{ReadRepository, Repository, ShortCode, UrlRecord};
use tracing::trace;

/// In-memory implementation of the Repository trait using DashMap.
///
/// `put_if_absent` goes through the entry API, which holds the shard lock
/// across the check and the insert. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: DashMap<ShortCode, UrlRecord>,
    by_url: DashMap<String, ShortCode>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: DashMap::with_capacity(capacity),
            by_url: DashMap::with_capacity(capacity),
        }
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        Ok(self.records.get(code).map(|entry| entry.value().clone()))
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        Ok(self.records.contains_key(code))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn put_if_absent(&self, code: &ShortCode, record: UrlRecord) -> Result<bool> {
        match self.records.entry(code.clone()) {
            Entry::Occupied(_) => {
                trace!(code = %code, "code already taken");
                Ok(false)
            }
            Entry::Vacant(slot) => {
                let original_url = record.original_url.clone();
                slot.insert(record);
                // first mapping for a URL wins the reverse index
                self.by_url.entry(original_url).or_insert_with(|| code.clone());
                Ok(true)
            }
        }
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortCode>> {
        Ok(self.by_url.get(original_url).map(|code| code.value().clone()))
    }

    async fn increment_hits(&self, code: &ShortCode) -> Result<()> {
        if let Some(mut record) = self.records.get_mut(code) {
            record.hit_count = record.hit_count.saturating_add(1);
        }
        Ok(())
    }
}
