use std::collections::HashMap;

use async_trait::async_trait;
use kinotek_core::models::VideoRecord;
use kinotek_core::{AppError, AppResult};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Storage seam for video records.
///
/// Implementations must make [`save`](VideoRepository::save) an idempotent
/// whole-record upsert: saving the same record twice is a no-op. The state
/// machine, the completion worker, and the repair job all mutate through this
/// trait concurrently without locks.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Insert a new record. Fails if the id already exists.
    async fn insert(&self, record: VideoRecord) -> AppResult<VideoRecord>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<VideoRecord>>;

    /// Every record, newest upload first.
    async fn list_all(&self) -> AppResult<Vec<VideoRecord>>;

    /// Records explicitly marked visible, newest upload first. Unknown
    /// visibility counts as hidden.
    async fn list_visible(&self) -> AppResult<Vec<VideoRecord>>;

    /// Upsert the full record by id.
    async fn save(&self, record: VideoRecord) -> AppResult<VideoRecord>;

    /// Remove a record; returns whether it existed.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// In-memory repository backing the single-node deployment and the tests.
#[derive(Default)]
pub struct InMemoryVideoRepository {
    records: RwLock<HashMap<Uuid, VideoRecord>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(records: &mut [VideoRecord]) {
    records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn insert(&self, record: VideoRecord) -> AppResult<VideoRecord> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.id) {
            return Err(AppError::InvalidInput(format!(
                "record {} already exists",
                record.id
            )));
        }
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<VideoRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> AppResult<Vec<VideoRecord>> {
        let mut all: Vec<_> = self.records.read().await.values().cloned().collect();
        newest_first(&mut all);
        Ok(all)
    }

    async fn list_visible(&self) -> AppResult<Vec<VideoRecord>> {
        let mut visible: Vec<_> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.is_visible())
            .cloned()
            .collect();
        newest_first(&mut visible);
        Ok(visible)
    }

    async fn save(&self, record: VideoRecord) -> AppResult<VideoRecord> {
        self.records.write().await.insert(record.id, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.records.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use kinotek_core::models::ConversionStatus;

    #[tokio::test]
    async fn insert_then_find_round_trips() {
        let repo = InMemoryVideoRepository::new();
        let record = VideoRecord::new("clip");
        let id = record.id;

        repo.insert(record).await.unwrap();

        let found = repo.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.title, "clip");
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn double_insert_is_rejected() {
        let repo = InMemoryVideoRepository::new();
        let record = VideoRecord::new("clip");

        repo.insert(record.clone()).await.unwrap();
        assert!(repo.insert(record).await.is_err());
    }

    #[tokio::test]
    async fn save_upserts_and_is_idempotent() {
        let repo = InMemoryVideoRepository::new();
        let mut record = VideoRecord::new("clip");
        repo.insert(record.clone()).await.unwrap();

        record.visible = Some(false);
        repo.save(record.clone()).await.unwrap();
        repo.save(record.clone()).await.unwrap();

        let found = repo.find_by_id(record.id).await.unwrap().unwrap();
        assert_eq!(found.visible, Some(false));
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_filters_visibility() {
        let repo = InMemoryVideoRepository::new();

        let mut old = VideoRecord::new("old");
        old.uploaded_at = Utc::now() - Duration::hours(2);
        let mut hidden = VideoRecord::new("hidden");
        hidden.visible = Some(false);
        hidden.uploaded_at = Utc::now() - Duration::hours(1);
        let mut unknown = VideoRecord::new("unknown");
        unknown.visible = None;
        unknown.status = ConversionStatus::Completed;
        let new = VideoRecord::new("new");

        for record in [old, hidden, unknown, new] {
            repo.insert(record).await.unwrap();
        }

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all.first().unwrap().title, "new");
        assert_eq!(all.last().unwrap().title, "old");

        let visible: Vec<_> = repo
            .list_visible()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(visible, ["new", "old"]);
    }

    #[tokio::test]
    async fn delete_reports_whether_the_record_existed() {
        let repo = InMemoryVideoRepository::new();
        let record = VideoRecord::new("clip");
        let id = record.id;
        repo.insert(record).await.unwrap();

        assert!(repo.delete(id).await.unwrap());
        assert!(!repo.delete(id).await.unwrap());
        assert!(repo.find_by_id(id).await.unwrap().is_none());
    }
}
