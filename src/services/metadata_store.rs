//! src/services/metadata_store.rs
//!
//! MetadataStore — the `images` table in SQLite, keyed by id. Mirrors the
//! key-value surface the handlers need: put, get, delete, scan.

use crate::models::image::ImageRecord;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type MetadataResult<T> = Result<T, MetadataError>;

#[derive(Clone)]
pub struct MetadataStore {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl MetadataStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert or overwrite the record keyed by its id.
    pub async fn put_item(&self, record: &ImageRecord) -> MetadataResult<()> {
        sqlx::query(
            "INSERT INTO images (id, filename, user, description, created_at, original_name)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                filename = excluded.filename,
                user = excluded.user,
                description = excluded.description,
                created_at = excluded.created_at,
                original_name = excluded.original_name",
        )
        .bind(&record.id)
        .bind(&record.filename)
        .bind(&record.user)
        .bind(&record.description)
        .bind(record.created_at)
        .bind(&record.original_name)
        .execute(&*self.db)
        .await?;

        debug!("stored metadata for {}", record.id);
        Ok(())
    }

    pub async fn get_item(&self, id: &str) -> MetadataResult<Option<ImageRecord>> {
        let record = sqlx::query_as::<_, ImageRecord>(
            "SELECT id, filename, user, description, created_at, original_name
             FROM images WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(record)
    }

    /// Delete the record for `id`. Returns whether a row was removed.
    pub async fn delete_item(&self, id: &str) -> MetadataResult<bool> {
        let result = sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All records in store order.
    pub async fn scan(&self) -> MetadataResult<Vec<ImageRecord>> {
        let records = sqlx::query_as::<_, ImageRecord>(
            "SELECT id, filename, user, description, created_at, original_name FROM images",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(records)
    }
}
