//! Background completion worker for freshly uploaded videos.
//!
//! Encoding is simulated: after a configured delay the record flips to
//! `Completed` through the state machine. The task is detached from the
//! request that spawned it; callers re-fetch the record to observe the
//! terminal state.

use std::sync::Arc;
use std::time::Duration;

use kinotek_core::models::ConversionStatus;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::catalog::VideoCatalogService;

pub struct CompletionWorker {
    catalog: Arc<VideoCatalogService>,
    delay: Duration,
}

/// Handle to one spawned completion task. Dropping it detaches the task;
/// the record still reaches a terminal state.
#[derive(Debug)]
pub struct CompletionHandle {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl CompletionHandle {
    /// Abandon the simulated encode; the record transitions to `Failed`.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Wait for the task to finish. Every path ends in a terminal
    /// transition, so this resolves after either outcome.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

impl CompletionWorker {
    pub fn new(catalog: Arc<VideoCatalogService>, delay: Duration) -> Self {
        Self { catalog, delay }
    }

    /// Schedule the completion flip for `video_id` and return immediately.
    pub fn spawn(&self, video_id: Uuid) -> CompletionHandle {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let catalog = Arc::clone(&self.catalog);
        let delay = self.delay;

        let handle = tokio::spawn(async move {
            // Biased so that a cancellation arriving after the delay has
            // already elapsed still counts as completed.
            let outcome = tokio::select! {
                biased;
                _ = tokio::time::sleep(delay) => ConversionStatus::Completed,
                _ = task_token.cancelled() => ConversionStatus::Failed,
            };

            match catalog.set_status(video_id, outcome).await {
                Ok(_) => tracing::info!(
                    video_id = %video_id,
                    status = %outcome,
                    "Video processing finished"
                ),
                Err(e) => tracing::error!(
                    video_id = %video_id,
                    status = %outcome,
                    error = %e,
                    "Could not record processing outcome"
                ),
            }
        });

        CompletionHandle { token, handle }
    }
}
