//! Playback session state

use playman_common::{EpisodeRef, MediaId};
use serde::Serialize;

/// The one active playback
///
/// Created when playback starts, mutated on every progress sync, dropped
/// when playback stops or a new session replaces it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSession {
    /// Media entry being watched
    pub media_id: MediaId,
    /// Currently playing unit
    pub episode: EpisodeRef,
    /// Last known position in seconds
    pub position_seconds: f64,
    /// Session is detached from the remote library
    pub is_offline: bool,
}

impl PlaybackSession {
    /// Start a session at position 0
    pub fn start(episode: EpisodeRef, is_offline: bool) -> Self {
        Self {
            media_id: episode.media_id,
            episode,
            position_seconds: 0.0,
            is_offline,
        }
    }

    /// Switch to another unit of the same media, rewinding to 0
    pub fn switch_episode(&mut self, episode: EpisodeRef) {
        self.media_id = episode.media_id;
        self.episode = episode;
        self.position_seconds = 0.0;
    }
}
