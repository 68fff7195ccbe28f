//! Catalog service: record CRUD and the conversion state machine.

use std::sync::Arc;

use chrono::Utc;
use kinotek_core::models::{ConversionStatus, MediaAsset, VideoRecord};
use kinotek_core::{AppError, AppResult};
use kinotek_db::VideoRepository;
use kinotek_storage::MediaStore;
use uuid::Uuid;

/// Fields callers may supply when creating a record.
///
/// Anything left out is defaulted the way the direct-creation path expects:
/// status `Completed`, visible, counters zeroed, timestamp now.
#[derive(Debug, Default, Clone)]
pub struct NewVideoRecord {
    pub title: String,
    pub description: Option<String>,
    pub video: Option<MediaAsset>,
    pub thumbnail: Option<MediaAsset>,
    pub duration_seconds: Option<u32>,
    pub status: Option<ConversionStatus>,
}

pub struct VideoCatalogService {
    repo: Arc<dyn VideoRepository>,
    store: Arc<MediaStore>,
}

impl VideoCatalogService {
    pub fn new(repo: Arc<dyn VideoRepository>, store: Arc<MediaStore>) -> Self {
        Self { repo, store }
    }

    /// Create a record. The direct path creates records already converted
    /// and visible; the upload path passes `status: Some(Processing)` and
    /// lets the completion worker finish the job.
    pub async fn create(&self, new: NewVideoRecord) -> AppResult<VideoRecord> {
        if new.title.trim().is_empty() {
            return Err(AppError::InvalidInput("title must not be empty".into()));
        }

        let record = VideoRecord {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            video: new.video,
            thumbnail: new.thumbnail,
            duration_seconds: new.duration_seconds.unwrap_or(1).max(1),
            uploaded_at: Utc::now(),
            views: 0,
            likes: 0,
            comments: 0,
            shares: 0,
            status: new.status.unwrap_or(ConversionStatus::Completed),
            visible: Some(true),
        };

        let record = self.repo.insert(record).await?;
        tracing::info!(
            video_id = %record.id,
            title = %record.title,
            status = %record.status,
            "Created video record"
        );
        Ok(record)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<VideoRecord> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("video {id}")))
    }

    pub async fn list(&self, include_hidden: bool) -> AppResult<Vec<VideoRecord>> {
        if include_hidden {
            self.repo.list_all().await
        } else {
            self.repo.list_visible().await
        }
    }

    /// The sole status transition path. The visibility the new status forces
    /// lands in the same save. Re-asserting the current status is a no-op.
    pub async fn set_status(&self, id: Uuid, next: ConversionStatus) -> AppResult<VideoRecord> {
        let mut record = self.get(id).await?;
        record.apply_status(next)?;
        let record = self.repo.save(record).await?;
        tracing::info!(
            video_id = %id,
            status = %next,
            visible = ?record.visible,
            "Updated conversion status"
        );
        Ok(record)
    }

    pub async fn set_visibility(&self, id: Uuid, visible: bool) -> AppResult<VideoRecord> {
        let mut record = self.get(id).await?;
        record.visible = Some(visible);
        let record = self.repo.save(record).await?;
        tracing::debug!(video_id = %id, visible, "Updated visibility");
        Ok(record)
    }

    /// Delete the record first, then try to remove its files. File removal
    /// failures are logged only; the record is already gone, so the caller
    /// still gets a success.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let record = self.get(id).await?;
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound(format!("video {id}")));
        }

        for asset in [&record.video, &record.thumbnail].into_iter().flatten() {
            if let Err(e) = self.store.remove(asset.kind, &asset.generated_name).await {
                tracing::warn!(
                    video_id = %id,
                    file = %asset.generated_name,
                    error = %e,
                    "Could not delete media file, leaving orphan"
                );
            }
        }

        tracing::info!(video_id = %id, "Deleted video record");
        Ok(())
    }
}
