//! Playback session controller
//!
//! Synchronous state machine owning the current `PlaybackSession` and the
//! optional `Playlist`.
//!
//! Playlist states:
//! - Idle -> Active on `start_playlist`
//! - Active -> Active on `playlist_next` while items remain (cursor + 1)
//! - Active -> Idle on `playlist_next` at the last item, on
//!   `cancel_current_playlist`, and whenever a standalone session replaces it
//!
//! Every operation checks all of its preconditions before touching state, so
//! a rejected call leaves the controller exactly as it was. The one failure
//! that does change state is playlist exhaustion, which is a terminal
//! transition: the playlist and session are cleared and the error reported.

use crate::error::{Error, Result};
use crate::playback::commit::{Commit, Notice, ProgressRecord};
use crate::playback::library::MediaLibrary;
use crate::playback::playlist::Playlist;
use crate::playback::session::PlaybackSession;
use chrono::Utc;
use playman_common::events::PlaymanEvent;
use playman_common::{EpisodeRef, LocalFile, MediaId, QueryKey};
use serde::Serialize;
use tracing::{debug, info};

/// Read-only view of controller state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    pub session: Option<PlaybackSession>,
    pub playlist: Vec<EpisodeRef>,
    /// Index of the playing playlist item, -1 when no playlist is active
    pub playlist_cursor: i64,
}

pub struct PlaybackController {
    session: Option<PlaybackSession>,
    playlist: Option<Playlist>,
    library: MediaLibrary,
    outbox: Commit,
}

impl PlaybackController {
    pub fn new(library: MediaLibrary) -> Self {
        Self {
            session: None,
            playlist: None,
            library,
            outbox: Commit::default(),
        }
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn playlist(&self) -> Option<&Playlist> {
        self.playlist.as_ref()
    }

    /// Playlist cursor, -1 when idle
    pub fn playlist_cursor(&self) -> i64 {
        self.playlist
            .as_ref()
            .map(|p| p.cursor() as i64)
            .unwrap_or(-1)
    }

    pub fn library(&self) -> &MediaLibrary {
        &self.library
    }

    pub fn add_local_file(&mut self, file: LocalFile) {
        debug!(
            "Adding media {} episode {} to library",
            file.media_id, file.episode_number
        );
        self.library.add(file);
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            session: self.session.clone(),
            playlist: self
                .playlist
                .as_ref()
                .map(|p| p.items().to_vec())
                .unwrap_or_default(),
            playlist_cursor: self.playlist_cursor(),
        }
    }

    /// Drain post-commit work accumulated since the last call
    pub fn take_commit(&mut self) -> Commit {
        std::mem::take(&mut self.outbox)
    }

    /// Start a standalone session, ending any active playlist
    pub fn start_playback(&mut self, episode: EpisodeRef, offline: bool) -> Result<MediaId> {
        if self.playlist.take().is_some() {
            info!("Standalone playback replaces the active playlist");
            self.outbox.event(PlaymanEvent::PlaylistEnded {
                cancelled: true,
                timestamp: Utc::now(),
            });
        }

        let media_id = episode.media_id;
        info!("Playback started: {}", episode);
        self.begin_session(episode, offline);
        Ok(media_id)
    }

    /// Stop the session and any playlist driving it
    pub fn stop_playback(&mut self) -> Result<bool> {
        if self.session.is_none() {
            return Err(Error::NoActiveSession);
        }

        if self.playlist.take().is_some() {
            self.outbox.event(PlaymanEvent::PlaylistEnded {
                cancelled: true,
                timestamp: Utc::now(),
            });
        }
        self.end_session();
        info!("Playback stopped");
        Ok(true)
    }

    /// Record the playback position of the current session
    ///
    /// Returns `media_id` so callers can invalidate views that depend on it.
    /// Online syncs invalidate the entry, the library collection and the
    /// tracking collection; offline syncs only the offline snapshot.
    pub fn sync_progress(
        &mut self,
        media_id: MediaId,
        position_seconds: f64,
        offline: bool,
    ) -> Result<MediaId> {
        if !position_seconds.is_finite() || position_seconds < 0.0 {
            return Err(Error::InvalidPosition(position_seconds));
        }

        let session = match self.session.as_mut() {
            Some(session) if session.media_id == media_id => session,
            _ => return Err(Error::UnknownSession(media_id)),
        };

        session.position_seconds = position_seconds;
        session.is_offline = offline;
        debug!(
            "Progress synced for media {}: {:.1}s (offline: {})",
            media_id, position_seconds, offline
        );

        self.outbox.progress = Some(ProgressRecord {
            media_id,
            episode: session.episode.clone(),
            position_seconds,
        });
        self.outbox.event(PlaymanEvent::ProgressSynced {
            media_id,
            position_seconds,
            timestamp: Utc::now(),
        });
        self.outbox
            .invalidate
            .extend(QueryKey::after_progress_sync(media_id, offline));

        Ok(media_id)
    }

    /// Advance the session to the next episode of the same media
    pub fn play_next_episode(&mut self) -> Result<bool> {
        let session = self.session.as_mut().ok_or(Error::NoActiveSession)?;

        let next = self
            .library
            .next_episode(&session.episode)
            .ok_or(Error::NoNextEpisode {
                media_id: session.media_id,
                episode_number: session.episode.episode_number,
            })?;

        info!("Playing next episode: {}", next);
        session.switch_episode(next.clone());
        self.outbox.event(PlaymanEvent::EpisodeChanged {
            episode: next,
            timestamp: Utc::now(),
        });
        Ok(true)
    }

    /// Replace any playlist with `items` and start playing the first one
    pub fn start_playlist(&mut self, items: Vec<EpisodeRef>, offline: bool) -> Result<bool> {
        let playlist = Playlist::new(items)?;
        let first = playlist.current().clone();
        let item_count = playlist.len();

        if self.playlist.is_some() {
            debug!("Replacing active playlist");
        }
        self.playlist = Some(playlist);

        info!("Playlist started with {} items", item_count);
        self.outbox.event(PlaymanEvent::PlaylistStarted {
            item_count,
            timestamp: Utc::now(),
        });
        self.begin_session(first, offline);
        self.outbox.invalidate.push(QueryKey::Playlists);
        Ok(true)
    }

    /// Terminate the active playlist and its session without advancing
    ///
    /// Not idempotent: a second call fails with `NoActivePlaylist`.
    pub fn cancel_current_playlist(&mut self) -> Result<bool> {
        if self.playlist.take().is_none() {
            return Err(Error::NoActivePlaylist);
        }

        info!("Playlist cancelled");
        self.outbox.event(PlaymanEvent::PlaylistEnded {
            cancelled: true,
            timestamp: Utc::now(),
        });
        self.end_session();
        self.outbox.notices.push(Notice::info("Cancelling playlist"));
        Ok(true)
    }

    /// Advance the playlist cursor and play that item
    ///
    /// At the last item the playlist is cleared, the session stopped and
    /// `PlaylistExhausted` returned.
    pub fn playlist_next(&mut self, offline: bool) -> Result<bool> {
        let playlist = self.playlist.as_mut().ok_or(Error::NoActivePlaylist)?;

        let next = match playlist.advance() {
            Some(episode) => episode.clone(),
            None => {
                info!("Playlist exhausted after {} items", playlist.len());
                self.playlist = None;
                self.outbox.event(PlaymanEvent::PlaylistEnded {
                    cancelled: false,
                    timestamp: Utc::now(),
                });
                self.end_session();
                return Err(Error::PlaylistExhausted);
            }
        };
        let cursor = playlist.cursor();

        info!("Playlist advanced to item {}: {}", cursor, next);
        self.outbox.event(PlaymanEvent::PlaylistAdvanced {
            cursor,
            episode: next.clone(),
            timestamp: Utc::now(),
        });
        self.begin_session(next, offline);
        self.outbox.notices.push(Notice::info("Loading next file"));
        Ok(true)
    }

    fn begin_session(&mut self, episode: EpisodeRef, offline: bool) {
        self.outbox.event(PlaymanEvent::PlaybackStarted {
            episode: episode.clone(),
            offline,
            timestamp: Utc::now(),
        });
        self.session = Some(PlaybackSession::start(episode, offline));
    }

    fn end_session(&mut self) {
        if self.session.take().is_some() {
            self.outbox.event(PlaymanEvent::PlaybackStopped {
                timestamp: Utc::now(),
            });
        }
    }
}
