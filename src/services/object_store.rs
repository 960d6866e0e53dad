//! Object store abstraction used by the image service.
//!
//! The gateway only needs two backend calls: store one object and enumerate
//! the bucket. `S3ObjectStore` is the production implementation; tests run
//! against `MemoryObjectStore`.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("put `{key}` into bucket `{bucket}` failed: {detail}")]
    Put {
        bucket: String,
        key: String,
        detail: String,
    },
    #[error("listing bucket `{bucket}` failed: {detail}")]
    List { bucket: String, detail: String },
}

impl StoreError {
    /// Backend-provided failure detail, suitable for returning to callers.
    pub fn detail(&self) -> &str {
        match self {
            StoreError::Put { detail, .. } | StoreError::List { detail, .. } => detail,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One entry of a bucket listing, as reported by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub key: String,
    pub size_bytes: i64,
    pub last_modified: Option<DateTime<Utc>>,
}

#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket every call operates on.
    fn bucket(&self) -> &str;

    /// Store `body` under `key` with the given `Content-Type`.
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> StoreResult<()>;

    /// List every object in the bucket, in key order.
    async fn list_objects(&self) -> StoreResult<Vec<StoredObject>>;
}
