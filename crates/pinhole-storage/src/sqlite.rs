use async_trait::async_trait;
use jiff::Timestamp;
use pinhole_core::repository::Result;
use pinhole_core::{ReadRepository, Repository, ShortCode, StorageError, UrlRecord};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, trace};

const SCHEMA: &str = include_str!("../ddl/sqlite/url_mappings.sql");

const MAX_CONNECTIONS: u32 = 8;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite implementation of the repository contract.
///
/// Uniqueness of codes is enforced by the `UNIQUE` constraint on
/// `url_mappings.code`; `put_if_absent` uses `ON CONFLICT DO NOTHING` and
/// inspects the affected row count, so the check and the insert are a
/// single statement. `created_at` is stored with microsecond precision.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

#[derive(Debug, FromRow)]
struct MappingRow {
    original_url: String,
    created_at: i64,
    hit_count: i64,
}

impl TryFrom<MappingRow> for UrlRecord {
    type Error = StorageError;

    fn try_from(row: MappingRow) -> Result<Self> {
        let created_at = Timestamp::from_microsecond(row.created_at).map_err(|e| {
            StorageError::InvalidData(format!(
                "invalid created_at timestamp '{}': {e}",
                row.created_at
            ))
        })?;
        let hit_count = u64::try_from(row.hit_count).map_err(|_| {
            StorageError::InvalidData(format!("negative hit_count '{}'", row.hit_count))
        })?;

        Ok(UrlRecord {
            original_url: row.original_url,
            created_at,
            hit_count,
        })
    }
}

impl SqliteRepository {
    /// Creates a repository from an existing pool. The schema is not touched;
    /// call [`SqliteRepository::migrate`] when needed.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens a pool for `database_url` (e.g. `sqlite://pinhole.db` or
    /// `sqlite::memory:`), creating the file and schema if missing.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(database_url)
            .map_err(map_sqlx_error)?
            .create_if_missing(true)
            .busy_timeout(BUSY_TIMEOUT);
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool = pool_options(in_memory)
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        let repository = Self::new(pool);
        repository.migrate().await?;
        debug!(database_url, "sqlite repository ready");
        Ok(repository)
    }

    /// Creates the `url_mappings` table and its indexes if they do not exist.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn pool_options(in_memory: bool) -> SqlitePoolOptions {
    let options = SqlitePoolOptions::new().acquire_timeout(ACQUIRE_TIMEOUT);
    if !in_memory {
        return options.max_connections(MAX_CONNECTIONS);
    }

    // a private in-memory database lives exactly as long as its single
    // connection, which must therefore never be reaped
    options
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        sqlx::Error::Database(ref db) if is_busy(db.code().as_deref()) => {
            StorageError::Unavailable(message)
        }
        _ => StorageError::Query(message),
    }
}

/// SQLITE_BUSY (5) and SQLITE_LOCKED (6), including extended codes.
fn is_busy(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .is_some_and(|c| matches!(c & 0xff, 5 | 6))
}

#[async_trait]
impl ReadRepository for SqliteRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlRecord>> {
        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            SELECT original_url, created_at, hit_count
            FROM url_mappings
            WHERE code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(UrlRecord::try_from).transpose()
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM url_mappings
            WHERE code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn put_if_absent(&self, code: &ShortCode, record: UrlRecord) -> Result<bool> {
        let hit_count = i64::try_from(record.hit_count).unwrap_or(i64::MAX);

        let result = sqlx::query(
            r#"
            INSERT INTO url_mappings (code, original_url, created_at, hit_count)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(code) DO NOTHING
            "#,
        )
        .bind(code.as_str())
        .bind(record.original_url)
        .bind(record.created_at.as_microsecond())
        .bind(hit_count)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let inserted = result.rows_affected() == 1;
        if !inserted {
            trace!(code = %code, "code already taken");
        }
        Ok(inserted)
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortCode>> {
        let code: Option<String> = sqlx::query_scalar(
            r#"
            SELECT code
            FROM url_mappings
            WHERE original_url = ?
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        code.map(|c| ShortCode::new(c).map_err(|e| StorageError::InvalidData(e.to_string())))
            .transpose()
    }

    async fn increment_hits(&self, code: &ShortCode) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE url_mappings
            SET hit_count = hit_count + 1
            WHERE code = ?
            "#,
        )
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
