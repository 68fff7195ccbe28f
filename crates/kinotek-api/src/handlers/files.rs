//! Read-back of stored media files.
//!
//! Serves `/{videos,thumbnails}/{generated_name}` straight from the store's
//! base directories. The content type is guessed from the file extension;
//! clients that uploaded exotic types get `application/octet-stream` back.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::Response;
use kinotek_core::models::AssetKind;
use kinotek_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

pub async fn serve_video(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    serve_file(&state, AssetKind::Video, &filename).await
}

pub async fn serve_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    serve_file(&state, AssetKind::Thumbnail, &filename).await
}

async fn serve_file(
    state: &AppState,
    kind: AssetKind,
    filename: &str,
) -> Result<Response, HttpAppError> {
    // Generated names are flat; anything with separators never came from us.
    if filename.contains("..") || filename.contains('/') || filename.contains('\\') {
        return Err(AppError::InvalidInput(format!("invalid filename: {filename}")).into());
    }

    let path = state.store.path_for(kind, filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::NotFound(format!("{kind} file {filename}")).into());
        }
        Err(e) => {
            return Err(AppError::Internal(format!("could not read {filename}: {e}")).into());
        }
    };

    let content_type = mime_guess::from_path(filename).first_or_octet_stream();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{filename}\""),
        )
        .body(Body::from(bytes))
        .map_err(|e| AppError::Internal(format!("could not build response: {e}")).into())
}
