use crate::services::image_service::{ImageError, MAX_UPLOAD_BYTES};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight error carrying the status, a short message and, for
/// backend failures, the detail reported by the object store.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub details: Option<String>,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            details: None,
        }
    }

    /// Shortcut for a 400 Bad Request
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// 500 for object store failures, keeping the backend's explanation.
    pub fn upstream(msg: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {}", self.message, details),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<ImageError> for AppError {
    fn from(err: ImageError) -> Self {
        match &err {
            ImageError::MissingImage => {
                tracing::debug!("rejected request: {}", err);
                AppError::validation("No image was provided")
            }
            ImageError::InvalidBase64 => {
                tracing::debug!("rejected request: {}", err);
                AppError::validation("Invalid base64 image data")
            }
            ImageError::TooLarge { .. } => {
                tracing::debug!("rejected request: {}", err);
                AppError::new(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    format!("Image exceeds the {} MiB limit", MAX_UPLOAD_BYTES / (1024 * 1024)),
                )
            }
            ImageError::Upload(source) => {
                tracing::error!("Failed to upload image: {}", source);
                AppError::upstream("Failed to upload image", source.detail())
            }
            ImageError::List(source) => {
                tracing::error!("Failed to list images: {}", source);
                AppError::upstream("Failed to list images", source.detail())
            }
        }
    }
}
