//! SQLite-backed [`VectorStore`] implementation.
//!
//! One `chunks` table holds every stored record, keyed by
//! `(source_path, chunk_index)`; embeddings are little-endian f32 BLOBs.
//! Nearest-neighbor retrieval scores every stored row with cosine
//! similarity, sorts, and truncates — there is no approximate index, so
//! `search_breadth` acts as a result bound after scoring rather than a
//! pre-filter (a pre-scoring row limit would make later insertions
//! unreachable).

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::error::StoreError;
use crate::models::{RetrievedChunk, StoredRecord};
use crate::store::{blob_to_vec, cosine_similarity, vec_to_blob, VectorStore};

/// SQLite implementation of the [`VectorStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the schema if it does not exist. Idempotent.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                source_path TEXT NOT NULL,
                chunk_index INTEGER NOT NULL,
                chunk_text TEXT NOT NULL,
                embedding BLOB NOT NULL,
                PRIMARY KEY (source_path, chunk_index)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn insert(&self, record: &StoredRecord) -> Result<(), StoreError> {
        let blob = vec_to_blob(&record.embedding);

        sqlx::query(
            "INSERT INTO chunks (source_path, chunk_index, chunk_text, embedding) VALUES (?, ?, ?, ?)",
        )
        .bind(&record.source_path)
        .bind(record.chunk_index)
        .bind(&record.chunk_text)
        .bind(&blob)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_for_source(&self, source_path: &str) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks WHERE source_path = ?")
            .bind(source_path)
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    async fn delete_for_source(&self, source_path: &str) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM chunks WHERE source_path = ?")
            .bind(source_path)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn nearest(
        &self,
        query_vec: &[f32],
        k: usize,
        search_breadth: usize,
    ) -> Result<Vec<RetrievedChunk>, StoreError> {
        let rows =
            sqlx::query("SELECT source_path, chunk_index, chunk_text, embedding FROM chunks")
                .fetch_all(&self.pool)
                .await?;

        let mut candidates: Vec<RetrievedChunk> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                let vec = blob_to_vec(&blob);
                RetrievedChunk {
                    source_path: row.get("source_path"),
                    chunk_index: row.get("chunk_index"),
                    text: row.get("chunk_text"),
                    score: cosine_similarity(query_vec, &vec) as f64,
                }
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        candidates.truncate(k.min(search_breadth));

        Ok(candidates)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
