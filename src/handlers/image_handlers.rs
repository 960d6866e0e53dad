//! HTTP handlers for image uploads and listing.
//! Input decoding lives here; naming, storage and URL construction are
//! delegated to `ImageService`.

use crate::{
    errors::AppError,
    models::image::{Base64UploadRequest, ListImagesResponse, UploadResponse, UploadedImage},
    services::image_service::{ImageError, ImageService, MAX_UPLOAD_BYTES},
};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
};
use bytes::{Bytes, BytesMut};

/// Name of the multipart field carrying the file.
const IMAGE_FIELD: &str = "image";
const UPLOAD_OK: &str = "Image uploaded successfully!";

/// `POST /upload` — multipart form with the file in the `image` field.
///
/// Other fields, and an `image` part sent as plain text without a filename,
/// are ignored. A request that is not multipart at all is treated the same
/// as one without a file.
pub async fn upload_multipart(
    State(service): State<ImageService>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let Ok(mut multipart) = multipart else {
        return Err(ImageError::MissingImage.into());
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) || field.file_name().is_none() {
            continue;
        }
        let content_type = field.content_type().map(str::to_owned);
        let body = read_limited(field).await?;

        let uploaded = service
            .upload_bytes(body, content_type.as_deref())
            .await?;
        return Ok(Json(upload_response(uploaded)));
    }

    Err(ImageError::MissingImage.into())
}

/// `POST /upload-base64` — JSON `{ "image": "...", "mimeType": "..." }`.
pub async fn upload_base64(
    State(service): State<ImageService>,
    payload: Result<Json<Base64UploadRequest>, JsonRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let Json(req) = payload.map_err(|rejection| AppError::validation(rejection.body_text()))?;

    let uploaded = service
        .upload_base64(req.image.as_deref(), req.mime_type.as_deref())
        .await?;
    Ok(Json(upload_response(uploaded)))
}

/// `GET /images` — every object in the bucket.
pub async fn list_images(
    State(service): State<ImageService>,
) -> Result<Json<ListImagesResponse>, AppError> {
    let images = service.list_images().await?;

    Ok(Json(ListImagesResponse {
        success: true,
        count: images.len(),
        images,
    }))
}

fn upload_response(image: UploadedImage) -> UploadResponse {
    UploadResponse {
        success: true,
        message: UPLOAD_OK.into(),
        image,
    }
}

/// Buffer a file field, giving up as soon as it grows past the upload limit.
async fn read_limited(mut field: Field<'_>) -> Result<Bytes, AppError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if buf.len() + chunk.len() > MAX_UPLOAD_BYTES {
            return Err(ImageError::TooLarge {
                size: buf.len() + chunk.len(),
                limit: MAX_UPLOAD_BYTES,
            }
            .into());
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

fn multipart_error(err: MultipartError) -> AppError {
    let status = err.status();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(status, err.body_text())
    } else {
        AppError::validation(err.body_text())
    }
}
