//! Batch repair of status/visibility drift.
//!
//! The state machine keeps status and visibility consistent for every record
//! it touches, but records mutated around it (bulk imports, direct field
//! edits, partial failures) can drift. The repair service restores the
//! invariant in a single pass over the whole store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use kinotek_core::models::{ConversionStatus, VideoRecord};
use kinotek_core::AppResult;
use kinotek_db::VideoRepository;
use serde::Serialize;
use uuid::Uuid;

/// Decides whether `reconcile` must force a record visible.
///
/// Swappable because the treatment of `Failed` records is an open product
/// question: the behavior currently shipped forces them visible like
/// completed ones.
pub trait RepairPolicy: Send + Sync {
    fn should_force_visible(&self, record: &VideoRecord) -> bool;
}

/// Current production policy: records in a terminal state (`Completed` and
/// `Failed` alike) must be visible, and unknown visibility never survives a
/// pass regardless of status.
pub struct TerminalVisiblePolicy;

impl RepairPolicy for TerminalVisiblePolicy {
    fn should_force_visible(&self, record: &VideoRecord) -> bool {
        match record.visible {
            Some(true) => false,
            None => true,
            Some(false) => matches!(
                record.status,
                ConversionStatus::Completed | ConversionStatus::Failed
            ),
        }
    }
}

/// Alternative policy that leaves failed records hidden; only completed ones
/// are forced visible. Unknown visibility is still coerced.
pub struct CompletedOnlyPolicy;

impl RepairPolicy for CompletedOnlyPolicy {
    fn should_force_visible(&self, record: &VideoRecord) -> bool {
        match record.visible {
            Some(true) => false,
            None => true,
            Some(false) => record.status == ConversionStatus::Completed,
        }
    }
}

/// Outcome of one batch pass.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RepairReport {
    pub fixed_count: usize,
    pub total_count: usize,
}

/// Read-only per-record diagnostics entry.
#[derive(Debug, Clone, Serialize)]
pub struct RecordSnapshot {
    pub id: Uuid,
    pub title: String,
    pub status: ConversionStatus,
    pub visible: Option<bool>,
    pub uploaded_at: DateTime<Utc>,
    pub video_path: Option<String>,
    pub thumbnail_path: Option<String>,
}

impl From<&VideoRecord> for RecordSnapshot {
    fn from(record: &VideoRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            status: record.status,
            visible: record.visible,
            uploaded_at: record.uploaded_at,
            video_path: record.video.as_ref().map(|a| a.public_path()),
            thumbnail_path: record.thumbnail.as_ref().map(|a| a.public_path()),
        }
    }
}

/// Aggregate view over the whole catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogSnapshot {
    pub total: usize,
    pub visible: usize,
    pub invisible: usize,
    pub completed: usize,
    pub pending: usize,
    pub processing: usize,
    pub failed: usize,
    pub records: Vec<RecordSnapshot>,
}

pub struct RepairService {
    repo: Arc<dyn VideoRepository>,
    policy: Arc<dyn RepairPolicy>,
}

impl RepairService {
    pub fn new(repo: Arc<dyn VideoRepository>, policy: Arc<dyn RepairPolicy>) -> Self {
        Self { repo, policy }
    }

    /// One pass over every record, forcing visibility where the policy says
    /// the flags drifted apart. Each record commits on its own; a failed save
    /// is logged and skipped, and the returned count reflects only successful
    /// fixes. Running the pass again right away fixes nothing.
    pub async fn reconcile(&self) -> AppResult<RepairReport> {
        let all = self.repo.list_all().await?;
        let total_count = all.len();
        let mut fixed_count = 0;

        for mut record in all {
            if !self.policy.should_force_visible(&record) {
                continue;
            }
            let id = record.id;
            let status = record.status;
            record.visible = Some(true);
            match self.repo.save(record).await {
                Ok(_) => {
                    fixed_count += 1;
                    tracing::info!(video_id = %id, status = %status, "Fixed visibility");
                }
                Err(e) => {
                    tracing::error!(
                        video_id = %id,
                        error = %e,
                        "Could not save repaired record, skipping"
                    );
                }
            }
        }

        tracing::info!(fixed_count, total_count, "Reconcile pass finished");
        Ok(RepairReport {
            fixed_count,
            total_count,
        })
    }

    /// Blunt recovery tool: every record not explicitly visible becomes
    /// visible, whatever its status. Idempotent by construction.
    pub async fn force_visible(&self) -> AppResult<RepairReport> {
        let all = self.repo.list_all().await?;
        let total_count = all.len();
        let mut fixed_count = 0;

        for mut record in all {
            if record.visible == Some(true) {
                continue;
            }
            let id = record.id;
            record.visible = Some(true);
            match self.repo.save(record).await {
                Ok(_) => {
                    fixed_count += 1;
                    tracing::info!(video_id = %id, "Forced visibility");
                }
                Err(e) => {
                    tracing::error!(
                        video_id = %id,
                        error = %e,
                        "Could not save repaired record, skipping"
                    );
                }
            }
        }

        tracing::info!(fixed_count, total_count, "Force-visible pass finished");
        Ok(RepairReport {
            fixed_count,
            total_count,
        })
    }

    /// Read-only diagnostics: aggregate counts plus one entry per record.
    pub async fn snapshot(&self) -> AppResult<CatalogSnapshot> {
        let all = self.repo.list_all().await?;
        let count_status =
            |status: ConversionStatus| all.iter().filter(|r| r.status == status).count();
        let visible = all.iter().filter(|r| r.is_visible()).count();

        Ok(CatalogSnapshot {
            total: all.len(),
            visible,
            invisible: all.len() - visible,
            completed: count_status(ConversionStatus::Completed),
            pending: count_status(ConversionStatus::Pending),
            processing: count_status(ConversionStatus::Processing),
            failed: count_status(ConversionStatus::Failed),
            records: all.iter().map(RecordSnapshot::from).collect(),
        })
    }
}
