//! SQLite-backed persistent chunk table.
//!
//! Holds the canonical `id -> text` rows written at ingestion time. The
//! vector index only returns ids; this table (with the in-memory store as
//! fallback) turns them back into text.

use std::path::PathBuf;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use crate::error::RagError;

pub struct SqliteChunkTable {
    pool: SqlitePool,
}

impl SqliteChunkTable {
    pub async fn with_path(db_path: PathBuf) -> Result<Self, RagError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(RagError::internal)?;

        let table = Self { pool };
        table.init_schema().await?;
        Ok(table)
    }

    async fn init_schema(&self) -> Result<(), RagError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rag_chunks (
                id TEXT PRIMARY KEY,
                text TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT '',
                metadata TEXT DEFAULT '{}'
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(RagError::internal)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_rag_chunks_source ON rag_chunks(source)")
            .execute(&self.pool)
            .await
            .map_err(RagError::internal)?;

        Ok(())
    }

    /// Insert or replace a chunk row by id. Re-ingesting identical content
    /// produces the same id, so this is the idempotent upsert the chunker's
    /// stable ids are designed for.
    pub async fn upsert(
        &self,
        id: &str,
        text: &str,
        source: &str,
        metadata: Option<&serde_json::Value>,
    ) -> Result<(), RagError> {
        let metadata_str = metadata
            .map(|m| m.to_string())
            .unwrap_or_else(|| "{}".to_string());

        sqlx::query(
            "INSERT OR REPLACE INTO rag_chunks (id, text, source, metadata)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(id)
        .bind(text)
        .bind(source)
        .bind(&metadata_str)
        .execute(&self.pool)
        .await
        .map_err(RagError::internal)?;

        Ok(())
    }

    /// Upsert several chunk rows in one transaction.
    pub async fn upsert_batch(
        &self,
        rows: &[(String, String, String, Option<serde_json::Value>)],
    ) -> Result<(), RagError> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(RagError::internal)?;

        for (id, text, source, metadata) in rows {
            let metadata_str = metadata
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| "{}".to_string());

            sqlx::query(
                "INSERT OR REPLACE INTO rag_chunks (id, text, source, metadata)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(id)
            .bind(text)
            .bind(source)
            .bind(&metadata_str)
            .execute(&mut *tx)
            .await
            .map_err(RagError::internal)?;
        }

        tx.commit().await.map_err(RagError::internal)?;
        Ok(())
    }

    /// Fetch the text for a chunk id, `None` when no row exists.
    pub async fn get(&self, id: &str) -> Result<Option<String>, RagError> {
        let row = sqlx::query("SELECT text FROM rag_chunks WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(RagError::internal)?;

        Ok(row.map(|r| r.get("text")))
    }

    /// Total row count, optionally restricted to one source.
    pub async fn count(&self, source: Option<&str>) -> Result<usize, RagError> {
        let count: i64 = if let Some(source) = source {
            sqlx::query_scalar("SELECT COUNT(*) FROM rag_chunks WHERE source = ?1")
                .bind(source)
                .fetch_one(&self.pool)
                .await
                .map_err(RagError::internal)?
        } else {
            sqlx::query_scalar("SELECT COUNT(*) FROM rag_chunks")
                .fetch_one(&self.pool)
                .await
                .map_err(RagError::internal)?
        };

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_table() -> (tempfile::TempDir, SqliteChunkTable) {
        let dir = tempfile::tempdir().unwrap();
        let table = SqliteChunkTable::with_path(dir.path().join("chunks.db"))
            .await
            .unwrap();
        (dir, table)
    }

    #[tokio::test]
    async fn upsert_and_get() {
        let (_dir, table) = test_table().await;

        table
            .upsert("c1", "take medications as prescribed", "guidelines", None)
            .await
            .unwrap();

        let text = table.get("c1").await.unwrap();
        assert_eq!(text.as_deref(), Some("take medications as prescribed"));
        assert_eq!(table.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let (_dir, table) = test_table().await;

        table.upsert("c1", "old text", "doc", None).await.unwrap();
        table.upsert("c1", "new text", "doc", None).await.unwrap();

        assert_eq!(table.count(None).await.unwrap(), 1);
        assert_eq!(table.get("c1").await.unwrap().as_deref(), Some("new text"));
    }

    #[tokio::test]
    async fn batch_upsert_and_source_count() {
        let (_dir, table) = test_table().await;

        let rows = vec![
            ("c1".to_string(), "a".to_string(), "doc1".to_string(), None),
            ("c2".to_string(), "b".to_string(), "doc1".to_string(), None),
            ("c3".to_string(), "c".to_string(), "doc2".to_string(), None),
        ];
        table.upsert_batch(&rows).await.unwrap();

        assert_eq!(table.count(None).await.unwrap(), 3);
        assert_eq!(table.count(Some("doc1")).await.unwrap(), 2);
        assert_eq!(table.count(Some("doc3")).await.unwrap(), 0);
    }
}
