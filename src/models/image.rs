//! Metadata record for one uploaded image.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row per uploaded image. The object store owns the payload bytes;
/// this record only holds the key (`filename`) that references them.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct ImageRecord {
    /// Generated UUID, immutable once created.
    pub id: String,

    /// Stored object key, `{id}{extension}`.
    pub filename: String,

    /// Uploading user, `"anonymous"` when omitted.
    pub user: String,

    /// Free-form description, empty when omitted.
    pub description: String,

    /// Creation time as epoch seconds. Stored as an integer so it
    /// serializes as a plain JSON number.
    pub created_at: i64,

    /// Filename declared by the client, kept for traceability. May be empty.
    pub original_name: String,
}
