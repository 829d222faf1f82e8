//! Database access layer
//!
//! Provides schema setup plus queries for playback progress and saved
//! playlists.

pub mod init;
pub mod playlists;
pub mod progress;
