use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

use super::asset::MediaAsset;
use crate::error::AppError;

/// Lifecycle stage of a record's media processing.
///
/// `Pending` and `Processing` are non-terminal; `Completed` and `Failed` are
/// terminal for a given upload attempt. A new upload creates a new record
/// rather than reviving an old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ConversionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, ConversionStatus::Completed | ConversionStatus::Failed)
    }

    /// Whether `next` is a legal transition target. Re-asserting the current
    /// status is always allowed; concurrent writers rely on that being a
    /// no-op.
    pub fn can_transition_to(self, next: ConversionStatus) -> bool {
        self == next || !self.is_terminal()
    }

    /// Visibility forced by entering this status, if any. Completed records
    /// become visible, failed records are hidden, non-terminal states leave
    /// the flag alone.
    pub fn forced_visibility(self) -> Option<bool> {
        match self {
            ConversionStatus::Completed => Some(true),
            ConversionStatus::Failed => Some(false),
            ConversionStatus::Pending | ConversionStatus::Processing => None,
        }
    }
}

impl Display for ConversionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ConversionStatus::Pending => write!(f, "pending"),
            ConversionStatus::Processing => write!(f, "processing"),
            ConversionStatus::Completed => write!(f, "completed"),
            ConversionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video: Option<MediaAsset>,
    pub thumbnail: Option<MediaAsset>,
    /// Playable length in whole seconds, at least 1 (or the probe's sentinel
    /// default when nothing better was available).
    pub duration_seconds: u32,
    pub uploaded_at: DateTime<Utc>,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub status: ConversionStatus,
    /// `None` means the flag was never written (legacy rows, bulk imports).
    /// Listing treats unknown as hidden; repair passes coerce it to `true`.
    pub visible: Option<bool>,
}

impl VideoRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            video: None,
            thumbnail: None,
            duration_seconds: 1,
            uploaded_at: Utc::now(),
            views: 0,
            likes: 0,
            comments: 0,
            shares: 0,
            status: ConversionStatus::Pending,
            visible: Some(true),
        }
    }

    /// Only records explicitly marked visible are eligible for listing.
    pub fn is_visible(&self) -> bool {
        self.visible == Some(true)
    }

    /// Apply a status transition together with the visibility it forces, as
    /// one update. This is the sole legal way to change `status`.
    pub fn apply_status(&mut self, next: ConversionStatus) -> Result<(), AppError> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        if let Some(visible) = next.forced_visibility() {
            self.visible = Some(visible);
        }
        Ok(())
    }
}

/// Client-facing projection of a [`VideoRecord`]. Asset references collapse
/// to their public paths; the filesystem location never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub duration_seconds: u32,
    pub uploaded_at: DateTime<Utc>,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub status: ConversionStatus,
    pub visible: Option<bool>,
}

impl From<VideoRecord> for VideoResponse {
    fn from(record: VideoRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            video_path: record.video.as_ref().map(MediaAsset::public_path),
            thumbnail_path: record.thumbnail.as_ref().map(MediaAsset::public_path),
            duration_seconds: record.duration_seconds,
            uploaded_at: record.uploaded_at,
            views: record.views,
            likes: record.likes,
            comments: record.comments,
            shares: record.shares,
            status: record.status,
            visible: record.visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_forces_visible_in_the_same_update() {
        let mut record = VideoRecord::new("clip");
        record.status = ConversionStatus::Processing;
        record.visible = Some(false);

        record.apply_status(ConversionStatus::Completed).unwrap();

        assert_eq!(record.status, ConversionStatus::Completed);
        assert_eq!(record.visible, Some(true));
    }

    #[test]
    fn failed_forces_hidden_in_the_same_update() {
        let mut record = VideoRecord::new("clip");
        record.status = ConversionStatus::Processing;
        record.visible = Some(true);

        record.apply_status(ConversionStatus::Failed).unwrap();

        assert_eq!(record.status, ConversionStatus::Failed);
        assert_eq!(record.visible, Some(false));
    }

    #[test]
    fn non_terminal_transitions_leave_visibility_alone() {
        let mut record = VideoRecord::new("clip");
        record.visible = None;

        record.apply_status(ConversionStatus::Processing).unwrap();

        assert_eq!(record.status, ConversionStatus::Processing);
        assert_eq!(record.visible, None);
    }

    #[test]
    fn terminal_states_reject_different_targets() {
        let mut record = VideoRecord::new("clip");
        record.status = ConversionStatus::Completed;

        let err = record
            .apply_status(ConversionStatus::Processing)
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::IllegalTransition {
                from: ConversionStatus::Completed,
                to: ConversionStatus::Processing,
            }
        ));

        record.status = ConversionStatus::Failed;
        assert!(record.apply_status(ConversionStatus::Completed).is_err());
    }

    #[test]
    fn reasserting_the_current_status_is_a_no_op() {
        let mut record = VideoRecord::new("clip");
        record.status = ConversionStatus::Completed;
        record.visible = Some(true);

        record.apply_status(ConversionStatus::Completed).unwrap();
        record.apply_status(ConversionStatus::Completed).unwrap();

        assert_eq!(record.status, ConversionStatus::Completed);
        assert_eq!(record.visible, Some(true));
    }

    #[test]
    fn pending_may_jump_straight_to_a_terminal_state() {
        let mut record = VideoRecord::new("clip");
        record.apply_status(ConversionStatus::Completed).unwrap();
        assert_eq!(record.status, ConversionStatus::Completed);

        let mut record = VideoRecord::new("clip");
        record.apply_status(ConversionStatus::Failed).unwrap();
        assert_eq!(record.visible, Some(false));
    }

    #[test]
    fn unknown_visibility_counts_as_hidden() {
        let mut record = VideoRecord::new("clip");
        record.visible = None;
        assert!(!record.is_visible());
        record.visible = Some(false);
        assert!(!record.is_visible());
        record.visible = Some(true);
        assert!(record.is_visible());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ConversionStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        let back: ConversionStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(back, ConversionStatus::Failed);
    }
}
