//! SQLite implementation of MemoryRepository
//!
//! Owns the `memory(id TEXT PRIMARY KEY, content TEXT)` table. The schema is
//! created at startup, before the server begins accepting requests.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};

use bubo::{DomainError, MemoryRecord, MemoryRepository};

/// SQLite implementation of MemoryRepository
pub struct SqliteMemoryRepository {
    pool: SqlitePool,
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct MemoryRow {
    id: String,
    content: String,
}

impl From<MemoryRow> for MemoryRecord {
    fn from(row: MemoryRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
        }
    }
}

impl SqliteMemoryRepository {
    /// Open (creating if missing) the database file and ensure the schema
    /// exists.
    pub async fn connect(path: &str) -> Result<Self, DomainError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;
        Self::with_pool(pool).await
    }

    /// Wrap an existing pool (tests use `sqlite::memory:`).
    pub async fn with_pool(pool: SqlitePool) -> Result<Self, DomainError> {
        sqlx::query("CREATE TABLE IF NOT EXISTS memory (id TEXT PRIMARY KEY, content TEXT)")
            .execute(&pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl MemoryRepository for SqliteMemoryRepository {
    async fn append(&self, record: MemoryRecord) -> Result<(), DomainError> {
        sqlx::query("INSERT INTO memory (id, content) VALUES (?1, ?2)")
            .bind(&record.id)
            .bind(&record.content)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Repository(e.to_string()))?;
        Ok(())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<MemoryRecord>, DomainError> {
        let rows = sqlx::query_as::<_, MemoryRow>(
            "SELECT id, content FROM memory ORDER BY rowid DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::Repository(e.to_string()))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> SqliteMemoryRepository {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        SqliteMemoryRepository::with_pool(pool).await.unwrap()
    }

    #[tokio::test]
    async fn appends_and_reads_back_newest_first() {
        let repo = repo().await;
        repo.append(MemoryRecord {
            id: "1".into(),
            content: "first".into(),
        })
        .await
        .unwrap();
        repo.append(MemoryRecord {
            id: "2".into(),
            content: "second".into(),
        })
        .await
        .unwrap();

        let records = repo.recent(10).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content, "second");
        assert_eq!(records[1].content, "first");
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected_by_the_primary_key() {
        let repo = repo().await;
        let record = MemoryRecord {
            id: "1".into(),
            content: "x".into(),
        };
        repo.append(record.clone()).await.unwrap();
        let err = repo.append(record).await.unwrap_err();
        assert!(matches!(err, DomainError::Repository(_)));
    }

    #[tokio::test]
    async fn recent_respects_the_limit() {
        let repo = repo().await;
        for i in 0..5 {
            repo.append(MemoryRecord::new(format!("entry {}", i)))
                .await
                .unwrap();
        }
        assert_eq!(repo.recent(3).await.unwrap().len(), 3);
    }
}
