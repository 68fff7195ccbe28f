//! End-to-end tests for the ingestion and consistency engine: upload through
//! completion, drift repair, and repair resilience against a store that fails
//! on individual records.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kinotek_core::models::{ConversionStatus, VideoRecord};
use kinotek_core::{AppError, AppResult};
use kinotek_db::{InMemoryVideoRepository, VideoRepository};
use kinotek_processing::DurationProbe;
use kinotek_services::{
    CompletionWorker, NewVideoRecord, RepairService, TerminalVisiblePolicy, UploadRequest,
    UploadService, UploadedFile, VideoCatalogService,
};
use kinotek_storage::MediaStore;
use tempfile::TempDir;
use uuid::Uuid;

const BITRATE: u64 = 500 * 1024;

struct Harness {
    _dir: TempDir,
    repo: Arc<dyn VideoRepository>,
    catalog: Arc<VideoCatalogService>,
    uploads: UploadService,
    repair: RepairService,
}

async fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(
        MediaStore::new(dir.path().join("videos"), dir.path().join("thumbnails"))
            .await
            .unwrap(),
    );
    let repo: Arc<dyn VideoRepository> = Arc::new(InMemoryVideoRepository::new());
    // The probe tool is absent on purpose; durations come from file size.
    let probe = Arc::new(DurationProbe::new("/nonexistent/kinotek-ffprobe", BITRATE, 60));
    let catalog = Arc::new(VideoCatalogService::new(
        Arc::clone(&repo),
        Arc::clone(&store),
    ));
    let worker = CompletionWorker::new(Arc::clone(&catalog), Duration::from_secs(3));
    let uploads = UploadService::new(store, probe, Arc::clone(&catalog), worker);
    let repair = RepairService::new(Arc::clone(&repo), Arc::new(TerminalVisiblePolicy));

    Harness {
        _dir: dir,
        repo,
        catalog,
        uploads,
        repair,
    }
}

fn upload_request(title: &str, bytes: usize) -> UploadRequest {
    UploadRequest {
        title: title.into(),
        description: None,
        video: UploadedFile {
            file_name: format!("{title}.mp4"),
            content_type: "video/mp4".into(),
            data: vec![0u8; bytes],
        },
        thumbnail: None,
    }
}

#[tokio::test(start_paused = true)]
async fn upload_completes_in_the_background() {
    let h = harness().await;

    let outcome = h
        .uploads
        .upload_video(upload_request("clip", 256_000))
        .await
        .unwrap();

    // The receipt is available before the record completes.
    assert_eq!(outcome.record.status, ConversionStatus::Processing);
    assert_eq!(
        outcome.receipt.duration_seconds,
        ((256_000u64 * 8) / BITRATE) as u32
    );

    tokio::time::advance(Duration::from_secs(4)).await;
    outcome.completion.join().await;

    let record = h.catalog.get(outcome.record.id).await.unwrap();
    assert_eq!(record.status, ConversionStatus::Completed);
    assert_eq!(record.visible, Some(true));
}

#[tokio::test(start_paused = true)]
async fn cancelled_upload_lands_in_failed_and_hidden() {
    let h = harness().await;

    let outcome = h
        .uploads
        .upload_video(upload_request("clip", 64_000))
        .await
        .unwrap();
    tokio::task::yield_now().await;

    outcome.completion.cancel();
    outcome.completion.join().await;

    let record = h.catalog.get(outcome.record.id).await.unwrap();
    assert_eq!(record.status, ConversionStatus::Failed);
    assert_eq!(record.visible, Some(false));

    // Reconcile under the current policy surfaces the failed record again.
    let report = h.repair.reconcile().await.unwrap();
    assert_eq!(report.fixed_count, 1);
    assert!(h.catalog.get(outcome.record.id).await.unwrap().is_visible());
}

#[tokio::test(start_paused = true)]
async fn concurrent_uploads_never_share_a_stored_name() {
    let h = harness().await;

    let mut names = HashSet::new();
    for i in 0..5 {
        let outcome = h
            .uploads
            .upload_video(upload_request(&format!("clip-{i}"), 64_000))
            .await
            .unwrap();
        assert!(names.insert(outcome.receipt.generated_name.clone()));
    }
}

#[tokio::test]
async fn drifted_records_are_reconciled_without_touching_healthy_ones() {
    let h = harness().await;

    // Simulate drift from writes that bypassed the state machine.
    let healthy = h
        .catalog
        .create(NewVideoRecord {
            title: "healthy".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let mut drifted = VideoRecord::new("drifted");
    drifted.status = ConversionStatus::Completed;
    drifted.visible = Some(false);
    let drifted = h.repo.insert(drifted).await.unwrap();
    let mut imported = VideoRecord::new("imported");
    imported.status = ConversionStatus::Pending;
    imported.visible = None;
    let imported = h.repo.insert(imported).await.unwrap();

    let report = h.repair.reconcile().await.unwrap();
    assert_eq!(report.fixed_count, 2);
    assert_eq!(report.total_count, 3);

    for id in [healthy.id, drifted.id, imported.id] {
        assert!(h.catalog.get(id).await.unwrap().is_visible());
    }

    assert_eq!(h.repair.reconcile().await.unwrap().fixed_count, 0);
}

/// Repository wrapper that fails every save for one chosen record.
struct FlakyRepository {
    inner: InMemoryVideoRepository,
    poisoned: Uuid,
    tripped: AtomicBool,
}

#[async_trait]
impl VideoRepository for FlakyRepository {
    async fn insert(&self, record: VideoRecord) -> AppResult<VideoRecord> {
        self.inner.insert(record).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<VideoRecord>> {
        self.inner.find_by_id(id).await
    }

    async fn list_all(&self) -> AppResult<Vec<VideoRecord>> {
        self.inner.list_all().await
    }

    async fn list_visible(&self) -> AppResult<Vec<VideoRecord>> {
        self.inner.list_visible().await
    }

    async fn save(&self, record: VideoRecord) -> AppResult<VideoRecord> {
        if record.id == self.poisoned {
            self.tripped.store(true, Ordering::SeqCst);
            return Err(AppError::Internal("simulated write failure".into()));
        }
        self.inner.save(record).await
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn repair_skips_failing_records_and_finishes_the_batch() {
    let mut poisoned = VideoRecord::new("poisoned");
    poisoned.status = ConversionStatus::Completed;
    poisoned.visible = Some(false);
    let mut fixable_a = VideoRecord::new("fixable-a");
    fixable_a.status = ConversionStatus::Completed;
    fixable_a.visible = Some(false);
    let mut fixable_b = VideoRecord::new("fixable-b");
    fixable_b.visible = None;

    let repo = Arc::new(FlakyRepository {
        inner: InMemoryVideoRepository::new(),
        poisoned: poisoned.id,
        tripped: AtomicBool::new(false),
    });
    for record in [poisoned.clone(), fixable_a.clone(), fixable_b.clone()] {
        repo.insert(record).await.unwrap();
    }

    let repair = RepairService::new(
        Arc::clone(&repo) as Arc<dyn VideoRepository>,
        Arc::new(TerminalVisiblePolicy),
    );

    let report = repair.reconcile().await.unwrap();

    // The poisoned record was attempted, failed, and skipped; the other two
    // committed.
    assert!(repo.tripped.load(Ordering::SeqCst));
    assert_eq!(report.fixed_count, 2);
    assert_eq!(report.total_count, 3);

    let poisoned_now = repo.find_by_id(poisoned.id).await.unwrap().unwrap();
    assert_eq!(poisoned_now.visible, Some(false));
    for id in [fixable_a.id, fixable_b.id] {
        let record = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(record.visible, Some(true));
    }
}
