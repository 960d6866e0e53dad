//! Defines the gateway's HTTP surface.
//!
//! ## Structure
//! - `GET  /health`        — liveness
//! - `POST /upload`        — multipart upload, file in field `image`
//! - `POST /upload-base64` — JSON upload, `{ image, mimeType? }`
//! - `GET  /images`        — list every object in the bucket

use crate::{
    handlers::{
        health_handlers::health,
        image_handlers::{list_images, upload_base64, upload_multipart},
    },
    services::image_service::ImageService,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Upper bound on any request body. Base64 payloads are a third larger than
/// the image they carry, so this sits well above the multipart file limit.
pub const MAX_REQUEST_BYTES: usize = 50 * 1024 * 1024;

/// Build the router for all gateway routes.
///
/// The router carries shared state (`ImageService`) to all handlers.
pub fn routes() -> Router<ImageService> {
    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload_multipart))
        .route("/upload-base64", post(upload_base64))
        .route("/images", get(list_images))
}

/// Full application: routes plus body limit, CORS and request tracing.
pub fn app(service: ImageService) -> Router {
    routes()
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
