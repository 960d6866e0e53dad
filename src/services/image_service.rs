//! src/services/image_service.rs
//!
//! ImageService — names incoming images, pushes them to the object store and
//! projects bucket listings into client-facing records. Holds no state of its
//! own between requests; the object store client is shared and long-lived.

use super::object_store::{ObjectStore, StoreError};
use crate::models::image::{ImageRecord, UploadedImage};
use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// Largest image accepted through the multipart endpoint.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";
const DEFAULT_EXTENSION: &str = "jpg";

/// Accepts padded and unpadded input alike.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("no image was provided")]
    MissingImage,
    #[error("image payload is not valid base64")]
    InvalidBase64,
    #[error("image is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },
    #[error("upload failed: {0}")]
    Upload(#[source] StoreError),
    #[error("listing failed: {0}")]
    List(#[source] StoreError),
}

pub type ImageResult<T> = Result<T, ImageError>;

#[derive(Clone)]
pub struct ImageService {
    store: Arc<dyn ObjectStore>,
    public_url: String,
}

impl ImageService {
    /// `public_url` is the base of every URL handed back to clients; the
    /// bucket name and object key are appended to it.
    pub fn new(store: Arc<dyn ObjectStore>, public_url: impl Into<String>) -> Self {
        Self {
            store,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Store raw bytes received from a multipart form.
    pub async fn upload_bytes(
        &self,
        body: Bytes,
        content_type: Option<&str>,
    ) -> ImageResult<UploadedImage> {
        if body.len() > MAX_UPLOAD_BYTES {
            return Err(ImageError::TooLarge {
                size: body.len(),
                limit: MAX_UPLOAD_BYTES,
            });
        }
        self.store_image(body, non_empty(content_type)).await
    }

    /// Store an image sent as a base64 string, optionally wrapped in a
    /// `data:<mime>;base64,` URL.
    ///
    /// An explicit `mime_type` wins over the one embedded in the data URL.
    pub async fn upload_base64(
        &self,
        image: Option<&str>,
        mime_type: Option<&str>,
    ) -> ImageResult<UploadedImage> {
        let image = non_empty(image.map(str::trim)).ok_or(ImageError::MissingImage)?;
        let (embedded_mime, payload) = split_data_url(image);
        let body = decode_base64(payload)?;

        let content_type = non_empty(mime_type).or(embedded_mime);
        self.store_image(body, content_type).await
    }

    /// Every object in the bucket, mapped to its public URL.
    pub async fn list_images(&self) -> ImageResult<Vec<ImageRecord>> {
        let objects = self.store.list_objects().await.map_err(ImageError::List)?;

        Ok(objects
            .into_iter()
            .map(|obj| ImageRecord {
                url: self.object_url(&obj.key),
                file_name: obj.key,
                size: obj.size_bytes,
                last_modified: obj.last_modified,
            })
            .collect())
    }

    /// The key's extension follows the caller's content type; only when none
    /// was given do the `jpg` / `image/jpeg` defaults apply.
    async fn store_image(
        &self,
        body: Bytes,
        content_type: Option<&str>,
    ) -> ImageResult<UploadedImage> {
        let file_name = object_key(content_type);
        let content_type = content_type.unwrap_or(DEFAULT_CONTENT_TYPE);
        self.store
            .put_object(&file_name, body, content_type)
            .await
            .map_err(ImageError::Upload)?;

        info!("Stored image {} in bucket {}", file_name, self.store.bucket());

        Ok(UploadedImage {
            url: self.object_url(&file_name),
            file_name,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_url, self.store.bucket(), key)
    }
}

/// Build a fresh `{uuid}.{ext}` key, `ext` being the content type's subtype.
fn object_key(content_type: Option<&str>) -> String {
    let ext = content_type
        .map(extension_for)
        .unwrap_or(DEFAULT_EXTENSION);
    format!("{}.{}", Uuid::new_v4(), ext)
}

fn extension_for(content_type: &str) -> &str {
    content_type
        .split_once('/')
        .map(|(_, subtype)| subtype.trim())
        .filter(|subtype| !subtype.is_empty())
        .unwrap_or(DEFAULT_EXTENSION)
}

/// Split `data:<mime>;base64,<payload>` into its mime and payload.
/// Input without that header is returned untouched as the payload.
fn split_data_url(input: &str) -> (Option<&str>, &str) {
    let Some(rest) = input.strip_prefix("data:") else {
        return (None, input);
    };
    match rest.split_once(";base64,") {
        Some((mime, payload)) if !mime.contains(',') => (non_empty(Some(mime)), payload),
        _ => (None, input),
    }
}

fn decode_base64(payload: &str) -> ImageResult<Bytes> {
    // URL-safe input is folded onto the standard alphabet.
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    let bytes = LENIENT_BASE64
        .decode(compact)
        .map_err(|_| ImageError::InvalidBase64)?;
    if bytes.is_empty() {
        return Err(ImageError::InvalidBase64);
    }
    Ok(Bytes::from(bytes))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory_store::MemoryObjectStore;
    use std::collections::HashSet;

    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

    fn service() -> (Arc<MemoryObjectStore>, ImageService) {
        let store = Arc::new(MemoryObjectStore::new("shopping-images"));
        let service = ImageService::new(store.clone(), "http://localhost:4566/");
        (store, service)
    }

    fn assert_key_shape(key: &str, ext: &str) {
        let (id, actual_ext) = key.rsplit_once('.').unwrap();
        assert_eq!(actual_ext, ext);
        assert!(Uuid::parse_str(id).is_ok(), "{id} is not a uuid");
    }

    #[test]
    fn extension_comes_from_subtype() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/webp"), "webp");
        assert_eq!(extension_for("image/"), "jpg");
        assert_eq!(extension_for("png"), "jpg");
    }

    #[test]
    fn data_url_header_is_split_off() {
        assert_eq!(
            split_data_url("data:image/png;base64,AAAA"),
            (Some("image/png"), "AAAA")
        );
        assert_eq!(split_data_url("AAAA"), (None, "AAAA"));
        assert_eq!(split_data_url("data:;base64,AAAA"), (None, "AAAA"));
    }

    #[test]
    fn base64_decoding_tolerates_whitespace_and_missing_padding() {
        assert_eq!(decode_base64("aGVs\nbG8=").unwrap(), Bytes::from_static(b"hello"));
        assert_eq!(decode_base64("aGVsbG8").unwrap(), Bytes::from_static(b"hello"));
        assert!(matches!(
            decode_base64("not base64!"),
            Err(ImageError::InvalidBase64)
        ));
    }

    #[test]
    fn base64_decoding_accepts_url_safe_alphabet() {
        assert_eq!(decode_base64("_-8=").unwrap(), Bytes::from_static(&[0xff, 0xef]));
        assert_eq!(decode_base64("/+8=").unwrap(), Bytes::from_static(&[0xff, 0xef]));
    }

    #[test]
    fn key_without_content_type_uses_jpg() {
        assert_key_shape(&object_key(None), "jpg");
        assert_key_shape(&object_key(Some("image/png")), "png");
    }

    #[tokio::test]
    async fn upload_bytes_stores_with_content_type() {
        let (store, service) = service();
        let uploaded = service
            .upload_bytes(Bytes::from_static(b"\x89PNG"), Some("image/png"))
            .await
            .unwrap();

        assert_key_shape(&uploaded.file_name, "png");
        assert_eq!(
            uploaded.url,
            format!("http://localhost:4566/shopping-images/{}", uploaded.file_name)
        );
        let stored = store.get(&uploaded.file_name).await.unwrap();
        assert_eq!(stored.content_type, "image/png");
        assert_eq!(stored.body, Bytes::from_static(b"\x89PNG"));
    }

    #[tokio::test]
    async fn upload_bytes_without_content_type_defaults_to_jpeg() {
        let (store, service) = service();
        let uploaded = service
            .upload_bytes(Bytes::from_static(b"raw"), None)
            .await
            .unwrap();

        assert_key_shape(&uploaded.file_name, "jpg");
        assert_eq!(
            store.get(&uploaded.file_name).await.unwrap().content_type,
            "image/jpeg"
        );
    }

    #[tokio::test]
    async fn oversized_upload_is_rejected_before_storing() {
        let (store, service) = service();
        let body = Bytes::from(vec![0u8; MAX_UPLOAD_BYTES + 1]);

        let err = service.upload_bytes(body, Some("image/png")).await.unwrap_err();
        assert!(matches!(err, ImageError::TooLarge { .. }));
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn base64_prefix_supplies_content_type() {
        let (store, service) = service();
        let image = format!("data:image/png;base64,{PNG_1X1}");

        let uploaded = service.upload_base64(Some(&image), None).await.unwrap();

        assert_key_shape(&uploaded.file_name, "png");
        let stored = store.get(&uploaded.file_name).await.unwrap();
        assert_eq!(stored.content_type, "image/png");
        assert!(stored.body.starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn explicit_mime_type_wins_over_prefix() {
        let (store, service) = service();
        let image = format!("data:image/png;base64,{PNG_1X1}");

        let uploaded = service
            .upload_base64(Some(&image), Some("image/webp"))
            .await
            .unwrap();

        assert_key_shape(&uploaded.file_name, "webp");
        assert_eq!(
            store.get(&uploaded.file_name).await.unwrap().content_type,
            "image/webp"
        );
    }

    #[tokio::test]
    async fn bare_base64_defaults_to_jpeg() {
        let (store, service) = service();
        let uploaded = service.upload_base64(Some(PNG_1X1), None).await.unwrap();

        assert_key_shape(&uploaded.file_name, "jpg");
        assert_eq!(
            store.get(&uploaded.file_name).await.unwrap().content_type,
            "image/jpeg"
        );
    }

    #[tokio::test]
    async fn missing_or_blank_base64_image_is_rejected() {
        let (store, service) = service();

        for image in [None, Some(""), Some("   ")] {
            let err = service.upload_base64(image, None).await.unwrap_err();
            assert!(matches!(err, ImageError::MissingImage));
        }
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_upload_error() {
        let (store, service) = service();
        store.set_unavailable(true);

        let err = service
            .upload_bytes(Bytes::from_static(b"x"), Some("image/gif"))
            .await
            .unwrap_err();
        match err {
            ImageError::Upload(source) => assert_eq!(source.detail(), "connection refused"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn listing_projects_urls() {
        let (_store, service) = service();
        let uploaded = service
            .upload_bytes(Bytes::from_static(b"abc"), Some("image/gif"))
            .await
            .unwrap();

        let images = service.list_images().await.unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].file_name, uploaded.file_name);
        assert_eq!(images[0].size, 3);
        assert_eq!(images[0].url, uploaded.url);
        assert!(images[0].last_modified.is_some());
    }

    #[tokio::test]
    async fn concurrent_uploads_get_distinct_keys() {
        let (store, service) = service();

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .upload_bytes(Bytes::from_static(b"img"), Some("image/png"))
                        .await
                        .unwrap()
                        .file_name
                })
            })
            .collect();

        let mut names = HashSet::new();
        for handle in handles {
            assert!(names.insert(handle.await.unwrap()));
        }
        assert_eq!(store.len().await, 32);
    }
}
