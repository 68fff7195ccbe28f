//! Multipart video upload.

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use kinotek_core::models::VideoResponse;
use kinotek_core::AppError;
use kinotek_services::{UploadReceipt, UploadRequest, UploadedFile};
use serde::Serialize;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub receipt: UploadReceipt,
    pub video: VideoResponse,
}

fn malformed(e: MultipartError) -> HttpAppError {
    AppError::InvalidInput(format!("malformed multipart body: {e}")).into()
}

async fn read_file(
    field: axum::extract::multipart::Field<'_>,
) -> Result<UploadedFile, HttpAppError> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = field.bytes().await.map_err(malformed)?.to_vec();
    Ok(UploadedFile {
        file_name,
        content_type,
        data,
    })
}

/// Accept a multipart upload: required `title` and `file` fields, optional
/// `description` and `thumbnail`. The response carries the storage receipt
/// and the record, which is still `processing` when the response goes out;
/// clients re-fetch it to observe the terminal state.
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), HttpAppError> {
    let mut title = None;
    let mut description = None;
    let mut video = None;
    let mut thumbnail = None;

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        match field.name().unwrap_or_default() {
            "title" => title = Some(field.text().await.map_err(malformed)?),
            "description" => {
                let text = field.text().await.map_err(malformed)?;
                if !text.is_empty() {
                    description = Some(text);
                }
            }
            "file" => video = Some(read_file(field).await?),
            "thumbnail" => thumbnail = Some(read_file(field).await?),
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    let title =
        title.ok_or_else(|| AppError::InvalidInput("missing title field".to_string()))?;
    let video =
        video.ok_or_else(|| AppError::InvalidInput("missing file field".to_string()))?;

    let outcome = state
        .uploads
        .upload_video(UploadRequest {
            title,
            description,
            video,
            thumbnail,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            receipt: outcome.receipt,
            video: outcome.record.into(),
        }),
    ))
}
