//! S3-compatible implementation of [`ObjectStore`] built on the AWS SDK.

use super::object_store::{ObjectStore, StoreError, StoreResult, StoredObject};
use crate::config::AppConfig;
use aws_config::{BehaviorVersion, Region, retry::RetryConfig};
use aws_sdk_s3::{
    Client,
    config::Credentials,
    error::DisplayErrorContext,
    primitives::{ByteStream, DateTime as SmithyDateTime},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Long-lived S3 client bound to a single bucket.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build the client from static credentials and a custom endpoint.
    ///
    /// Path-style addressing is forced so LocalStack and MinIO endpoints work
    /// without per-bucket DNS. Retries are disabled: a failed call is reported
    /// to the caller immediately.
    pub async fn from_config(cfg: &AppConfig) -> Self {
        let credentials = Credentials::new(
            cfg.access_key_id.clone(),
            cfg.secret_access_key.clone(),
            None,
            None,
            "image-gateway",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(&cfg.endpoint)
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        info!(
            "Initialized S3 client for bucket {} at {}",
            cfg.bucket, cfg.endpoint
        );

        Self::new(Client::from_conf(s3_config), cfg.bucket.clone())
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> StoreResult<()> {
        debug!("PutObject {}/{} ({} bytes)", self.bucket, key, body.len());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| StoreError::Put {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                detail: DisplayErrorContext(&err).to_string(),
            })?;

        Ok(())
    }

    async fn list_objects(&self) -> StoreResult<Vec<StoredObject>> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_continuation_token(continuation_token.take())
                .send()
                .await
                .map_err(|err| StoreError::List {
                    bucket: self.bucket.clone(),
                    detail: DisplayErrorContext(&err).to_string(),
                })?;

            objects.extend(page.contents().iter().filter_map(|entry| {
                Some(StoredObject {
                    key: entry.key()?.to_string(),
                    size_bytes: entry.size().unwrap_or(0),
                    last_modified: entry.last_modified().and_then(to_chrono),
                })
            }));

            match (page.is_truncated(), page.next_continuation_token()) {
                (Some(true), Some(token)) => {
                    debug!("ListObjectsV2 {} truncated, continuing", self.bucket);
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        Ok(objects)
    }
}

fn to_chrono(ts: &SmithyDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
}
