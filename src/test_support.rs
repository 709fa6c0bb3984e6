//! Shared fixtures for module tests: an in-memory metadata database with
//! the images table applied, and a full store-client pair rooted in a temp
//! directory.

use crate::services::{StoreClients, metadata_store::MetadataStore, object_store::ObjectStore};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::sync::Arc;
use tempfile::TempDir;

// Keep in sync with migrations/0001_init.sql.
const CREATE_IMAGES_TABLE: &str = "CREATE TABLE IF NOT EXISTS images (
    id TEXT PRIMARY KEY,
    filename TEXT NOT NULL,
    user TEXT NOT NULL DEFAULT 'anonymous',
    description TEXT NOT NULL DEFAULT '',
    created_at INTEGER NOT NULL,
    original_name TEXT NOT NULL DEFAULT ''
)";

pub const TEST_BUCKET: &str = "images-bucket";

/// Fresh in-memory SQLite pool with the schema applied. A single pooled
/// connection keeps the database alive for the test's duration.
pub async fn test_pool() -> Arc<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    sqlx::query(CREATE_IMAGES_TABLE)
        .execute(&pool)
        .await
        .expect("create images table");
    Arc::new(pool)
}

/// Store clients backed by a temp directory and an in-memory database.
/// The returned TempDir must stay alive for the duration of the test.
pub async fn test_stores() -> (StoreClients, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let objects = ObjectStore::new(dir.path(), TEST_BUCKET, "test-secret", 900);
    let metadata = MetadataStore::new(test_pool().await);
    (StoreClients { objects, metadata }, dir)
}
