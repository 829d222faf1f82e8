//! Event types for the Playman event system
//!
//! Events are broadcast by the playback manager and streamed to UI clients
//! over SSE. Cache invalidation and toast notices travel on the same bus.

use crate::media::{EpisodeRef, MediaId};
use crate::query_keys::QueryKey;
use serde::{Deserialize, Serialize};

/// Playman event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlaymanEvent {
    /// A new playback session started
    PlaybackStarted {
        episode: EpisodeRef,
        offline: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The playback session ended
    PlaybackStopped {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Progress recorded for the current session
    ProgressSynced {
        media_id: MediaId,
        position_seconds: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Session moved to the next episode of the same media
    EpisodeChanged {
        episode: EpisodeRef,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A playlist became active
    PlaylistStarted {
        item_count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playlist cursor advanced
    PlaylistAdvanced {
        cursor: usize,
        episode: EpisodeRef,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Playlist ended: cancelled by the user or exhausted
    PlaylistEnded {
        cancelled: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Clients must drop the cached view identified by `key`
    InvalidateQueries {
        key: QueryKey,
        path: Vec<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// User-facing notice
    Toast {
        level: ToastLevel,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Offline mode toggled
    OfflineModeChanged {
        offline: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PlaymanEvent {
    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            PlaymanEvent::PlaybackStarted { .. } => "PlaybackStarted",
            PlaymanEvent::PlaybackStopped { .. } => "PlaybackStopped",
            PlaymanEvent::ProgressSynced { .. } => "ProgressSynced",
            PlaymanEvent::EpisodeChanged { .. } => "EpisodeChanged",
            PlaymanEvent::PlaylistStarted { .. } => "PlaylistStarted",
            PlaymanEvent::PlaylistAdvanced { .. } => "PlaylistAdvanced",
            PlaymanEvent::PlaylistEnded { .. } => "PlaylistEnded",
            PlaymanEvent::InvalidateQueries { .. } => "InvalidateQueries",
            PlaymanEvent::Toast { .. } => "Toast",
            PlaymanEvent::OfflineModeChanged { .. } => "OfflineModeChanged",
        }
    }

    /// Invalidation event for a query key
    pub fn invalidate(key: QueryKey) -> Self {
        PlaymanEvent::InvalidateQueries {
            path: key.path(),
            key,
            timestamp: chrono::Utc::now(),
        }
    }
}

/// Toast severity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
}
