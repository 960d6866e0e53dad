//! Request and response shapes exchanged with gateway clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a successful upload: the generated key and its public URL.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub file_name: String,
    pub url: String,
}

/// A stored image as reported by `GET /images`.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Object key within the bucket.
    pub file_name: String,

    /// Size in bytes.
    pub size: i64,

    /// When the backend last wrote the object, if it reported it.
    pub last_modified: Option<DateTime<Utc>>,

    /// Public URL of the object.
    pub url: String,
}

/// JSON body accepted by `POST /upload-base64`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Base64UploadRequest {
    /// Base64 payload, optionally prefixed with `data:<mime>;base64,`.
    pub image: Option<String>,

    /// Content type of the decoded image.
    pub mime_type: Option<String>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub image: UploadedImage,
}

#[derive(Serialize, Debug)]
pub struct ListImagesResponse {
    pub success: bool,
    pub count: usize,
    pub images: Vec<ImageRecord>,
}
