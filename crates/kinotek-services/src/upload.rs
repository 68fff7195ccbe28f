//! Upload orchestration: store bytes, probe duration, create the record,
//! schedule completion.

use std::sync::Arc;

use kinotek_core::models::{AssetKind, ConversionStatus, VideoRecord};
use kinotek_core::AppError;
use kinotek_processing::DurationProbe;
use kinotek_storage::{MediaStore, StorageError};
use serde::Serialize;

use crate::catalog::{NewVideoRecord, VideoCatalogService};
use crate::worker::{CompletionHandle, CompletionWorker};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    App(#[from] AppError),
}

/// One file from the upload request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Upload entry point input: the video bytes, an optional thumbnail, and the
/// record metadata.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub title: String,
    pub description: Option<String>,
    pub video: UploadedFile,
    pub thumbnail: Option<UploadedFile>,
}

/// What the upload entry point hands back to the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReceipt {
    pub generated_name: String,
    pub public_path: String,
    pub byte_size: u64,
    pub duration_seconds: u32,
}

/// Result of a finished upload. The receipt is ready before the record
/// completes; `completion` is the detached worker task that will flip it.
#[derive(Debug)]
pub struct UploadOutcome {
    pub record: VideoRecord,
    pub receipt: UploadReceipt,
    pub completion: CompletionHandle,
}

pub struct UploadService {
    store: Arc<MediaStore>,
    probe: Arc<DurationProbe>,
    catalog: Arc<VideoCatalogService>,
    worker: CompletionWorker,
}

impl UploadService {
    pub fn new(
        store: Arc<MediaStore>,
        probe: Arc<DurationProbe>,
        catalog: Arc<VideoCatalogService>,
        worker: CompletionWorker,
    ) -> Self {
        Self {
            store,
            probe,
            catalog,
            worker,
        }
    }

    /// Full upload path: store the bytes, estimate the duration, create the
    /// record in `Processing`, and schedule the completion flip. Returns
    /// before the record reaches a terminal state; callers re-fetch to
    /// observe it.
    pub async fn upload_video(
        &self,
        request: UploadRequest,
    ) -> Result<UploadOutcome, UploadError> {
        let UploadRequest {
            title,
            description,
            video,
            thumbnail,
        } = request;

        if title.trim().is_empty() {
            return Err(AppError::InvalidInput("title must not be empty".into()).into());
        }

        let video_asset = self
            .store
            .store(
                &video.data,
                &video.file_name,
                &video.content_type,
                AssetKind::Video,
            )
            .await?;

        let duration_seconds = self.probe.estimate(&video_asset.storage_path).await;

        let thumbnail_asset = match thumbnail {
            Some(file) => Some(
                self.store
                    .store(
                        &file.data,
                        &file.file_name,
                        &file.content_type,
                        AssetKind::Thumbnail,
                    )
                    .await?,
            ),
            None => None,
        };

        let receipt = UploadReceipt {
            generated_name: video_asset.generated_name.clone(),
            public_path: video_asset.public_path(),
            byte_size: video_asset.byte_size,
            duration_seconds,
        };

        let record = self
            .catalog
            .create(NewVideoRecord {
                title,
                description,
                video: Some(video_asset),
                thumbnail: thumbnail_asset,
                duration_seconds: Some(duration_seconds),
                status: Some(ConversionStatus::Processing),
            })
            .await?;

        let completion = self.worker.spawn(record.id);
        tracing::info!(
            video_id = %record.id,
            file = %receipt.generated_name,
            duration_secs = duration_seconds,
            "Upload accepted, processing scheduled"
        );

        Ok(UploadOutcome {
            record,
            receipt,
            completion,
        })
    }
}
