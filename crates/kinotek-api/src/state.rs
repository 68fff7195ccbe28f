//! Application state: configuration plus the wired service graph.

use std::sync::Arc;

use kinotek_core::Config;
use kinotek_db::{InMemoryVideoRepository, VideoRepository};
use kinotek_processing::DurationProbe;
use kinotek_services::{
    CompletionWorker, RepairService, TerminalVisiblePolicy, UploadService, VideoCatalogService,
};
use kinotek_storage::MediaStore;

pub struct AppState {
    pub config: Config,
    pub store: Arc<MediaStore>,
    pub catalog: Arc<VideoCatalogService>,
    pub uploads: Arc<UploadService>,
    pub repair: Arc<RepairService>,
}

impl AppState {
    /// Wire the full service graph from configuration. Storage directories
    /// are created here; everything else is in-memory.
    pub async fn from_config(config: Config) -> anyhow::Result<Arc<Self>> {
        let store = Arc::new(MediaStore::new(config.video_dir(), config.thumbnail_dir()).await?);
        let repo: Arc<dyn VideoRepository> = Arc::new(InMemoryVideoRepository::new());
        let probe = Arc::new(DurationProbe::new(
            config.probe_tool(),
            config.assumed_bitrate_bps(),
            config.fallback_duration_secs(),
        ));

        let catalog = Arc::new(VideoCatalogService::new(
            Arc::clone(&repo),
            Arc::clone(&store),
        ));
        let worker = CompletionWorker::new(Arc::clone(&catalog), config.processing_delay());
        let uploads = Arc::new(UploadService::new(
            Arc::clone(&store),
            probe,
            Arc::clone(&catalog),
            worker,
        ));
        // Treatment of failed records is an open product question; the
        // permissive policy is what currently ships. Swap the policy here to
        // change it.
        let repair = Arc::new(RepairService::new(repo, Arc::new(TerminalVisiblePolicy)));

        Ok(Arc::new(Self {
            config,
            store,
            catalog,
            uploads,
            repair,
        }))
    }
}
