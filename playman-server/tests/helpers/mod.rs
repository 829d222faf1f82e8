//! Test helpers for playman-server integration tests
//!
//! Recording and misbehaving collaborators plus a small fixed library:
//! media 10 with episodes 1-3, media 20 with episodes 1-2.

#![allow(dead_code)]

use async_trait::async_trait;
use playman_common::{EpisodeRef, LocalFile, MediaId, QueryKey};
use playman_server::error::{Error, Result};
use playman_server::hooks::{CacheInvalidator, NotificationSink, ProgressStore};
use playman_server::playback::{Collaborators, MediaLibrary, Notice, PlaybackManager, ProgressRecord};
use playman_server::SharedState;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const HOOK_TIMEOUT: Duration = Duration::from_millis(100);

pub fn episode(media_id: MediaId, number: u32) -> EpisodeRef {
    EpisodeRef::new(media_id, number, format!("/anime/{}/{:02}.mkv", media_id, number))
}

pub fn library() -> MediaLibrary {
    let files = [(10, 1), (10, 2), (10, 3), (20, 1), (20, 2)]
        .into_iter()
        .map(|(media_id, n)| LocalFile {
            media_id,
            episode_number: n,
            path: episode(media_id, n).path,
        });
    MediaLibrary::from_files(files)
}

#[derive(Default)]
pub struct RecordingInvalidator {
    keys: Mutex<Vec<QueryKey>>,
}

impl RecordingInvalidator {
    pub fn keys(&self) -> Vec<QueryKey> {
        self.keys.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.keys.lock().unwrap().clear();
    }
}

#[async_trait]
impl CacheInvalidator for RecordingInvalidator {
    async fn invalidate(&self, key: &QueryKey) -> Result<()> {
        self.keys.lock().unwrap().push(key.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, notice: &Notice) -> Result<()> {
        self.notices.lock().unwrap().push(notice.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingProgressStore {
    records: Mutex<Vec<ProgressRecord>>,
}

impl RecordingProgressStore {
    pub fn records(&self) -> Vec<ProgressRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressStore for RecordingProgressStore {
    async fn record(&self, record: &ProgressRecord) -> Result<()> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Invalidator whose cache backend is unreachable
pub struct FailingInvalidator;

#[async_trait]
impl CacheInvalidator for FailingInvalidator {
    async fn invalidate(&self, _key: &QueryKey) -> Result<()> {
        Err(Error::Hook("cache backend unreachable".to_string()))
    }
}

/// Invalidator that never finishes within the hook timeout
pub struct StalledInvalidator;

#[async_trait]
impl CacheInvalidator for StalledInvalidator {
    async fn invalidate(&self, _key: &QueryKey) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(())
    }
}

pub struct Harness {
    pub manager: Arc<PlaybackManager>,
    pub state: Arc<SharedState>,
    pub invalidator: Arc<RecordingInvalidator>,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<RecordingProgressStore>,
}

/// Manager wired to recording collaborators
pub fn harness(offline: bool) -> Harness {
    let invalidator = Arc::new(RecordingInvalidator::default());
    let mut h = harness_with(offline, invalidator.clone());
    h.invalidator = invalidator;
    h
}

/// Manager with a custom invalidator; `invalidator` on the returned harness
/// stays empty
pub fn harness_with(offline: bool, custom: Arc<dyn CacheInvalidator>) -> Harness {
    let state = Arc::new(SharedState::new(offline));
    let notifier = Arc::new(RecordingNotifier::default());
    let store = Arc::new(RecordingProgressStore::default());

    let collaborators = Collaborators {
        invalidator: custom,
        notifier: notifier.clone(),
        offline: state.clone(),
        progress_store: Some(store.clone()),
    };

    let manager = Arc::new(PlaybackManager::new(
        library(),
        collaborators,
        Arc::clone(&state),
        HOOK_TIMEOUT,
    ));

    Harness {
        manager,
        state,
        invalidator: Arc::new(RecordingInvalidator::default()),
        notifier,
        store,
    }
}
