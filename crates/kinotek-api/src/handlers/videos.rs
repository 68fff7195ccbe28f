//! Video record CRUD.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kinotek_core::models::{ConversionStatus, VideoResponse};
use kinotek_services::NewVideoRecord;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;

/// Body of the direct-creation path. Records created here default to
/// `completed` and visible, the "instant" entry point; the upload endpoint is
/// the one that goes through processing.
#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub status: Option<ConversionStatus>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub include_hidden: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ConversionStatus,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVisibilityRequest {
    pub visible: bool,
}

pub async fn create_video(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateVideoRequest>,
) -> Result<(StatusCode, Json<VideoResponse>), HttpAppError> {
    let record = state
        .catalog
        .create(NewVideoRecord {
            title: body.title,
            description: body.description,
            video: None,
            thumbnail: None,
            duration_seconds: body.duration_seconds,
            status: body.status,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

pub async fn list_videos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<VideoResponse>>, HttpAppError> {
    let records = state.catalog.list(query.include_hidden).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let record = state.catalog.get(id).await?;
    Ok(Json(record.into()))
}

/// Status transitions go through the state machine; an illegal transition
/// out of a terminal state is a 409.
pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let record = state.catalog.set_status(id, body.status).await?;
    Ok(Json(record.into()))
}

pub async fn update_visibility(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateVisibilityRequest>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let record = state.catalog.set_visibility(id, body.visible).await?;
    Ok(Json(record.into()))
}

pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HttpAppError> {
    state.catalog.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
