//! src/services/object_store.rs
//!
//! ObjectStore — binary payloads on local disk beneath
//! `base_path/{bucket}/{key}`, plus signed retrieval URLs for the download
//! route. Durable writes go through a temp file with fsync before an atomic
//! rename. Metadata lives elsewhere; this store only ever sees bytes.

use bytes::Bytes;
use chrono::Utc;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

const MAX_OBJECT_KEY_LEN: usize = 1024;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("invalid object key")]
    InvalidKey,
    #[error("object `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type ObjectStoreResult<T> = Result<T, ObjectStoreError>;

#[derive(Clone)]
pub struct ObjectStore {
    /// Base directory on disk where payloads are stored.
    pub base_path: PathBuf,

    /// Bucket (container) name; one directory under `base_path`.
    pub bucket: String,

    /// Default lifetime for signed retrieval URLs.
    pub url_ttl_secs: i64,

    url_secret: String,
}

impl ObjectStore {
    pub fn new(
        base_path: impl Into<PathBuf>,
        bucket: impl Into<String>,
        url_secret: impl Into<String>,
        url_ttl_secs: i64,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            bucket: bucket.into(),
            url_secret: url_secret.into(),
            url_ttl_secs,
        }
    }

    /// Idempotent container provisioning: creates the bucket directory if
    /// it is missing.
    pub async fn ensure_bucket(&self) -> ObjectStoreResult<()> {
        fs::create_dir_all(self.bucket_root()).await?;
        Ok(())
    }

    fn bucket_root(&self) -> PathBuf {
        self.base_path.join(&self.bucket)
    }

    /// Basic key validation to avoid trivial path traversal vectors.
    ///
    /// Rejects empty or oversized keys, keys that begin with `/` or contain
    /// `..`, and keys with control or backslash bytes.
    fn ensure_key_safe(&self, key: &str) -> ObjectStoreResult<()> {
        if key.is_empty() || key.len() > MAX_OBJECT_KEY_LEN {
            return Err(ObjectStoreError::InvalidKey);
        }
        if key.starts_with('/') || key.contains("..") {
            return Err(ObjectStoreError::InvalidKey);
        }
        if key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return Err(ObjectStoreError::InvalidKey);
        }
        Ok(())
    }

    fn object_path(&self, key: &str) -> ObjectStoreResult<PathBuf> {
        self.ensure_key_safe(key)?;
        Ok(self.bucket_root().join(key))
    }

    /// Write an object durably under `key`, overwriting any previous payload.
    pub async fn put(&self, key: &str, bytes: &Bytes) -> ObjectStoreResult<()> {
        let file_path = self.object_path(key)?;
        let parent = file_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or(ObjectStoreError::InvalidKey)?;
        fs::create_dir_all(&parent).await?;

        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;
        let result = async {
            file.write_all(bytes).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        if let Err(err) = result {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(ObjectStoreError::Io(err));
        }

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&file_path).await?;
                fs::rename(&tmp_path, &file_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(ObjectStoreError::Io(err));
            }
        }

        debug!("stored object {key} ({} bytes)", bytes.len());
        Ok(())
    }

    /// Remove an object's payload. Missing files are treated as already
    /// deleted.
    pub async fn delete(&self, key: &str) -> ObjectStoreResult<()> {
        let file_path = self.object_path(key)?;
        match fs::remove_file(&file_path).await {
            Ok(_) => debug!("removed object {key}"),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("object {key} already missing");
            }
            Err(err) => return Err(ObjectStoreError::Io(err)),
        }
        Ok(())
    }

    /// Open an object for streaming out.
    pub async fn open_reader(&self, key: &str) -> ObjectStoreResult<File> {
        let file_path = self.object_path(key)?;
        File::open(&file_path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                ObjectStoreError::NotFound(key.to_string())
            } else {
                ObjectStoreError::Io(err)
            }
        })
    }

    /// Produce a time-limited retrieval URL for `key`, valid for
    /// `ttl_seconds` from now.
    pub fn get_signed_url(&self, key: &str, ttl_seconds: i64) -> String {
        let expires = Utc::now().timestamp() + ttl_seconds;
        let sig = self.signature_for(key, expires);
        format!("/files/{key}?expires={expires}&sig={sig}")
    }

    /// Check a presented signature: it must match `key`/`expires` and the
    /// expiry must still be in the future.
    pub fn verify_signature(&self, key: &str, expires: i64, sig: &str) -> bool {
        expires >= Utc::now().timestamp() && self.signature_for(key, expires) == sig
    }

    fn signature_for(&self, key: &str, expires: i64) -> String {
        format!(
            "{:x}",
            md5::compute(format!("{}:{}:{}", self.url_secret, key, expires))
        )
    }
}
