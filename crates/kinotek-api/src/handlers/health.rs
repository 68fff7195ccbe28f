//! Health check handler.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Liveness probe: the process is up and serving.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "healthy" })),
    )
}
