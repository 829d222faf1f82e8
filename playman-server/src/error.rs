//! Error types for playman-server
//!
//! Playback failures map onto a small taxonomy (`ErrorKind`) that the API
//! layer turns into HTTP status codes.

use playman_common::MediaId;
use thiserror::Error;

/// Main error type for playman-server
#[derive(Error, Debug)]
pub enum Error {
    /// Progress sync for a media id that is not the current session
    #[error("No playback session for media {0}")]
    UnknownSession(MediaId),

    /// Operation requires something to be playing
    #[error("Nothing is currently playing")]
    NoActiveSession,

    /// Library has no episode after the current one
    #[error("No next episode for media {media_id} after episode {episode_number}")]
    NoNextEpisode {
        media_id: MediaId,
        episode_number: u32,
    },

    /// Playlist started with no items
    #[error("Playlist is empty")]
    EmptyPlaylist,

    /// Progress position is negative or not a number
    #[error("Invalid playback position: {0}")]
    InvalidPosition(f64),

    /// Operation requires an active playlist
    #[error("No playlist is currently active")]
    NoActivePlaylist,

    /// Advance requested at the last playlist item
    #[error("Playlist finished, no more items")]
    PlaylistExhausted,

    /// Saved playlist lookup failed
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(i64),

    /// Library lookup failed
    #[error("Episode {episode_number} of media {media_id} not found in library")]
    EpisodeNotFound {
        media_id: MediaId,
        episode_number: u32,
    },

    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Post-commit collaborator failure
    #[error("Hook error: {0}")]
    Hook(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error taxonomy surfaced to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown session, media, episode or playlist
    NotFound,
    /// Operation not valid for the current state
    InvalidState,
    /// Rejected input
    Validation,
    /// Infrastructure failure
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownSession(_)
            | Error::NoNextEpisode { .. }
            | Error::PlaylistNotFound(_)
            | Error::EpisodeNotFound { .. } => ErrorKind::NotFound,
            Error::NoActiveSession | Error::NoActivePlaylist | Error::PlaylistExhausted => {
                ErrorKind::InvalidState
            }
            Error::EmptyPlaylist | Error::InvalidPosition(_) => ErrorKind::Validation,
            Error::Config(_)
            | Error::Database(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::Http(_)
            | Error::Hook(_)
            | Error::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<playman_common::Error> for Error {
    fn from(e: playman_common::Error) -> Self {
        match e {
            playman_common::Error::Io(e) => Error::Io(e),
            playman_common::Error::Json(e) => Error::Json(e),
            other => Error::Config(other.to_string()),
        }
    }
}

/// Convenience Result type using playman-server Error
pub type Result<T> = std::result::Result<T, Error>;
