//! In-memory video store.

use async_trait::async_trait;
use time::{Duration, OffsetDateTime, macros::datetime};
use tokio::sync::Mutex;

use super::types::{NewVideo, Resolution, StoreError, VideoId, VideoRecord, VideoUpdate};

/// Storage operations used by the HTTP surface.
///
/// Implementations perform no validation; callers are expected to pass values produced by
/// [`crate::videos::validation`].
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Every record, in insertion order.
    async fn list(&self) -> Vec<VideoRecord>;

    /// Fetch a single record.
    async fn get_by_id(&self, id: VideoId) -> Result<VideoRecord, StoreError>;

    /// Allocate an id, stamp timestamps and defaults, and append the record.
    async fn create(&self, video: NewVideo) -> VideoRecord;

    /// Overwrite the mutable fields of an existing record.
    async fn update(&self, id: VideoId, update: VideoUpdate) -> Result<VideoRecord, StoreError>;

    /// Remove and return the first record with `id`.
    async fn delete(&self, id: VideoId) -> Result<VideoRecord, StoreError>;

    /// Remove every record, returning how many were dropped.
    ///
    /// Reports [`StoreError::Empty`] when there was nothing to remove.
    async fn clear(&self) -> Result<usize, StoreError>;
}

/// Process-local store guarded by a single lock held for each whole operation.
#[derive(Default)]
pub struct InMemoryVideoStore {
    state: Mutex<StoreState>,
}

#[derive(Default)]
struct StoreState {
    videos: Vec<VideoRecord>,
    last_id: VideoId,
}

impl StoreState {
    /// Ids derive from the wall clock in milliseconds but never repeat or move backwards.
    fn next_id(&mut self, now: OffsetDateTime) -> VideoId {
        let millis = VideoId::try_from(now.unix_timestamp_nanos() / 1_000_000).unwrap_or(0);
        let id = millis.max(self.last_id.saturating_add(1));
        self.last_id = id;
        id
    }
}

impl InMemoryVideoStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `videos`.
    pub fn with_records(videos: Vec<VideoRecord>) -> Self {
        let last_id = videos.iter().map(|video| video.id).max().unwrap_or(0);
        Self {
            state: Mutex::new(StoreState { videos, last_id }),
        }
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoStore {
    async fn list(&self) -> Vec<VideoRecord> {
        self.state.lock().await.videos.clone()
    }

    async fn get_by_id(&self, id: VideoId) -> Result<VideoRecord, StoreError> {
        let state = self.state.lock().await;
        state
            .videos
            .iter()
            .find(|video| video.id == id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn create(&self, video: NewVideo) -> VideoRecord {
        let mut state = self.state.lock().await;
        let created_at = now_millis();
        let record = VideoRecord {
            id: state.next_id(created_at),
            title: video.title,
            author: video.author,
            can_be_downloaded: false,
            min_age_restriction: None,
            created_at,
            publication_date: video
                .publication_date
                .unwrap_or(created_at + Duration::days(1)),
            available_resolutions: video.available_resolutions,
        };
        state.videos.push(record.clone());
        record
    }

    async fn update(&self, id: VideoId, update: VideoUpdate) -> Result<VideoRecord, StoreError> {
        let mut state = self.state.lock().await;
        let video = state
            .videos
            .iter_mut()
            .find(|video| video.id == id)
            .ok_or(StoreError::NotFound(id))?;

        video.title = update.title;
        video.author = update.author;
        video.can_be_downloaded = update.can_be_downloaded;
        video.min_age_restriction = update.min_age_restriction;
        video.publication_date = update.publication_date;
        video.available_resolutions = update.available_resolutions;
        Ok(video.clone())
    }

    async fn delete(&self, id: VideoId) -> Result<VideoRecord, StoreError> {
        let mut state = self.state.lock().await;
        let index = state
            .videos
            .iter()
            .position(|video| video.id == id)
            .ok_or(StoreError::NotFound(id))?;
        Ok(state.videos.remove(index))
    }

    async fn clear(&self) -> Result<usize, StoreError> {
        let mut state = self.state.lock().await;
        if state.videos.is_empty() {
            return Err(StoreError::Empty);
        }
        let removed = state.videos.len();
        state.videos.clear();
        Ok(removed)
    }
}

/// Fixture record the service can be started with (`VIDEOS_SEED_FIXTURE`).
pub fn sample_video() -> VideoRecord {
    let stamp = datetime!(2023-07-24 12:54:39.991 UTC);
    VideoRecord {
        id: 1,
        title: "string".into(),
        author: "string".into(),
        can_be_downloaded: true,
        min_age_restriction: None,
        created_at: stamp,
        publication_date: stamp,
        available_resolutions: vec![Resolution::P144],
    }
}

/// Current UTC time truncated to whole milliseconds, matching the wire precision.
fn now_millis() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(u32::from(now.millisecond()) * 1_000_000)
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_video(title: &str) -> NewVideo {
        NewVideo {
            title: title.into(),
            author: "author".into(),
            available_resolutions: vec![Resolution::P480],
            publication_date: None,
        }
    }

    fn update(title: &str) -> VideoUpdate {
        VideoUpdate {
            title: title.into(),
            author: "editor".into(),
            can_be_downloaded: true,
            min_age_restriction: Some(12),
            publication_date: datetime!(2030-01-01 00:00:00 UTC),
            available_resolutions: vec![Resolution::P2160],
        }
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let store = InMemoryVideoStore::new();
        let record = store.create(new_video("first")).await;

        assert_eq!(record.title, "first");
        assert!(!record.can_be_downloaded);
        assert_eq!(record.min_age_restriction, None);
        assert_eq!(record.publication_date - record.created_at, Duration::days(1));
        assert_eq!(record.created_at.nanosecond() % 1_000_000, 0);
        assert_eq!(store.list().await, vec![record]);
    }

    #[tokio::test]
    async fn create_honors_supplied_publication_date() {
        let store = InMemoryVideoStore::new();
        let date = datetime!(2031-05-05 05:05:05 UTC);
        let record = store
            .create(NewVideo {
                publication_date: Some(date),
                ..new_video("scheduled")
            })
            .await;
        assert_eq!(record.publication_date, date);
    }

    #[tokio::test]
    async fn ids_are_unique_and_increasing() {
        let store = InMemoryVideoStore::new();
        let mut ids = Vec::new();
        for n in 0..50 {
            ids.push(store.create(new_video(&format!("video {n}"))).await.id);
        }
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let store = InMemoryVideoStore::new();
        store.create(new_video("a")).await;
        store.create(new_video("b")).await;
        store.create(new_video("c")).await;

        let titles: Vec<_> = store.list().await.into_iter().map(|v| v.title).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn update_overwrites_mutable_fields_only() {
        let store = InMemoryVideoStore::new();
        let original = store.create(new_video("before")).await;

        let updated = store
            .update(original.id, update("after"))
            .await
            .expect("update existing");

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.title, "after");
        assert_eq!(updated.author, "editor");
        assert!(updated.can_be_downloaded);
        assert_eq!(updated.min_age_restriction, Some(12));
        assert_eq!(updated.available_resolutions, vec![Resolution::P2160]);
        assert_eq!(store.get_by_id(original.id).await, Ok(updated));
    }

    #[tokio::test]
    async fn missing_ids_report_not_found() {
        let store = InMemoryVideoStore::new();
        assert_eq!(store.get_by_id(42).await, Err(StoreError::NotFound(42)));
        assert_eq!(
            store.update(42, update("x")).await,
            Err(StoreError::NotFound(42))
        );
        assert_eq!(store.delete(42).await, Err(StoreError::NotFound(42)));
    }

    #[tokio::test]
    async fn delete_returns_removed_record() {
        let store = InMemoryVideoStore::new();
        let keep = store.create(new_video("keep")).await;
        let gone = store.create(new_video("gone")).await;

        assert_eq!(store.delete(gone.id).await, Ok(gone.clone()));
        assert_eq!(store.get_by_id(gone.id).await, Err(StoreError::NotFound(gone.id)));
        assert_eq!(store.list().await, vec![keep]);
    }

    #[tokio::test]
    async fn clear_reports_empty_store() {
        let store = InMemoryVideoStore::new();
        assert_eq!(store.clear().await, Err(StoreError::Empty));

        store.create(new_video("a")).await;
        store.create(new_video("b")).await;
        assert_eq!(store.clear().await, Ok(2));
        assert!(store.list().await.is_empty());
        assert_eq!(store.clear().await, Err(StoreError::Empty));
    }

    #[tokio::test]
    async fn seeded_store_never_reissues_fixture_id() {
        let store = InMemoryVideoStore::with_records(vec![sample_video()]);
        assert_eq!(store.get_by_id(1).await, Ok(sample_video()));

        let created = store.create(new_video("fresh")).await;
        assert!(created.id > 1);
        assert_eq!(store.list().await.len(), 2);
    }

    #[test]
    fn next_id_moves_forward_when_clock_repeats() {
        let mut state = StoreState::default();
        let now = datetime!(2024-01-01 00:00:00 UTC);
        let first = state.next_id(now);
        let second = state.next_id(now);
        let earlier = state.next_id(now - Duration::seconds(5));
        assert_eq!(first, 1_704_067_200_000);
        assert_eq!(second, first + 1);
        assert_eq!(earlier, first + 2);
    }
}
