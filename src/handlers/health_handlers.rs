//! Health handler.
//!
//! - GET /health -> liveness, independent of the object store

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

/// `GET /health`
///
/// Always 200 OK. Performs no I/O, so it stays green while the backend is down.
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            message: "Backend is running!",
        }),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}
