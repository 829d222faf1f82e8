//! Playback manager
//!
//! Single logical owner of playback state. Mutations are serialized through
//! an async mutex around the controller. State-change events are broadcast
//! before the lock is released, so subscribers see them in commit order.
//! Post-commit hooks run after the lock is released, one at a time, each
//! bounded by `hook_timeout`. A hook that fails or times out is logged and
//! never rolls the mutation back.

use crate::error::{Error, Result};
use crate::hooks::{CacheInvalidator, NotificationSink, OfflineStatus, ProgressStore};
use crate::playback::commit::Commit;
use crate::playback::controller::{PlaybackController, PlaybackSnapshot};
use crate::playback::library::MediaLibrary;
use crate::state::SharedState;
use playman_common::{EpisodeRef, LocalFile, MediaId, QueryKey};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Collaborators invoked after each committed mutation
pub struct Collaborators {
    pub invalidator: Arc<dyn CacheInvalidator>,
    pub notifier: Arc<dyn NotificationSink>,
    pub offline: Arc<dyn OfflineStatus>,
    pub progress_store: Option<Arc<dyn ProgressStore>>,
}

pub struct PlaybackManager {
    controller: Mutex<PlaybackController>,
    collaborators: Collaborators,
    state: Arc<SharedState>,
    hook_timeout: Duration,
}

impl PlaybackManager {
    pub fn new(
        library: MediaLibrary,
        collaborators: Collaborators,
        state: Arc<SharedState>,
        hook_timeout: Duration,
    ) -> Self {
        Self {
            controller: Mutex::new(PlaybackController::new(library)),
            collaborators,
            state,
            hook_timeout,
        }
    }

    /// Start a standalone session for one episode from the library
    pub async fn start_playback(&self, media_id: MediaId, episode_number: u32) -> Result<MediaId> {
        let offline = self.collaborators.offline.is_offline();
        self.apply(|c| {
            let episode = c
                .library()
                .episode(media_id, episode_number)
                .ok_or(Error::EpisodeNotFound {
                    media_id,
                    episode_number,
                })?;
            c.start_playback(episode, offline)
        })
        .await
    }

    pub async fn stop_playback(&self) -> Result<bool> {
        self.apply(PlaybackController::stop_playback).await
    }

    /// Record the current position; offline mode is read once per call
    pub async fn sync_progress(&self, media_id: MediaId, position_seconds: f64) -> Result<MediaId> {
        let offline = self.collaborators.offline.is_offline();
        self.apply(|c| c.sync_progress(media_id, position_seconds, offline))
            .await
    }

    pub async fn play_next_episode(&self) -> Result<bool> {
        self.apply(PlaybackController::play_next_episode).await
    }

    pub async fn start_playlist(&self, items: Vec<EpisodeRef>) -> Result<bool> {
        let offline = self.collaborators.offline.is_offline();
        self.apply(|c| c.start_playlist(items, offline)).await
    }

    pub async fn cancel_current_playlist(&self) -> Result<bool> {
        self.apply(PlaybackController::cancel_current_playlist)
            .await
    }

    pub async fn playlist_next(&self) -> Result<bool> {
        let offline = self.collaborators.offline.is_offline();
        self.apply(|c| c.playlist_next(offline)).await
    }

    pub async fn snapshot(&self) -> PlaybackSnapshot {
        self.controller.lock().await.snapshot()
    }

    pub async fn local_files(&self) -> Vec<LocalFile> {
        self.controller.lock().await.library().all_files()
    }

    /// Library files of one media, in episode order
    pub async fn media_files(&self, media_id: MediaId) -> Vec<LocalFile> {
        self.controller.lock().await.library().files(media_id).to_vec()
    }

    pub async fn add_local_file(&self, file: LocalFile) {
        self.controller.lock().await.add_local_file(file);
    }

    /// Invalidate a cached view outside of a playback mutation
    pub async fn invalidate(&self, key: QueryKey) {
        self.run_hooks(Commit {
            invalidate: vec![key],
            ..Commit::default()
        })
        .await;
    }

    /// Run one controller operation, broadcast its events under the lock,
    /// then run its post-commit hooks
    ///
    /// The outbox is drained whether or not the operation succeeded: a
    /// rejected call leaves it empty, while playlist exhaustion commits a
    /// terminal transition and still reports an error.
    async fn apply<T>(
        &self,
        op: impl FnOnce(&mut PlaybackController) -> Result<T>,
    ) -> Result<T> {
        let (result, commit) = {
            let mut controller = self.controller.lock().await;
            let result = op(&mut *controller);
            let mut commit = controller.take_commit();
            for event in commit.events.drain(..) {
                self.state.broadcast_event(event);
            }
            (result, commit)
        };

        self.run_hooks(commit).await;
        result
    }

    async fn run_hooks(&self, commit: Commit) {
        if commit.is_empty() {
            return;
        }

        if let (Some(record), Some(store)) = (&commit.progress, &self.collaborators.progress_store)
        {
            self.bounded("record progress", store.record(record)).await;
        }

        for key in &commit.invalidate {
            debug!("Post-commit invalidation: {}", key);
            self.bounded("invalidate", self.collaborators.invalidator.invalidate(key))
                .await;
        }

        for notice in &commit.notices {
            self.bounded("notify", self.collaborators.notifier.notify(notice))
                .await;
        }
    }

    async fn bounded(&self, what: &str, hook: impl Future<Output = Result<()>>) {
        match tokio::time::timeout(self.hook_timeout, hook).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Post-commit hook '{}' failed: {}", what, e),
            Err(_) => warn!(
                "Post-commit hook '{}' timed out after {:?}, cached views may be briefly stale",
                what, self.hook_timeout
            ),
        }
    }
}
