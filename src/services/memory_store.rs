//! In-process [`ObjectStore`] used by the test suite.

use super::object_store::{ObjectStore, StoreError, StoreResult, StoredObject};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicBool, Ordering},
};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct MemoryObject {
    pub body: Bytes,
    pub content_type: String,
    pub last_modified: DateTime<Utc>,
}

/// Bucket held in a `BTreeMap` so listings come back in key order.
pub struct MemoryObjectStore {
    bucket: String,
    objects: RwLock<BTreeMap<String, MemoryObject>>,
    unavailable: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(BTreeMap::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail as if the backend were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn get(&self, key: &str) -> Option<MemoryObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    fn is_unavailable(&self) -> bool {
        self.unavailable.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> StoreResult<()> {
        if self.is_unavailable() {
            return Err(StoreError::Put {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                detail: "connection refused".into(),
            });
        }

        self.objects.write().await.insert(
            key.to_string(),
            MemoryObject {
                body,
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn list_objects(&self) -> StoreResult<Vec<StoredObject>> {
        if self.is_unavailable() {
            return Err(StoreError::List {
                bucket: self.bucket.clone(),
                detail: "connection refused".into(),
            });
        }

        Ok(self
            .objects
            .read()
            .await
            .iter()
            .map(|(key, obj)| StoredObject {
                key: key.clone(),
                size_bytes: obj.body.len() as i64,
                last_modified: Some(obj.last_modified),
            })
            .collect())
    }
}
