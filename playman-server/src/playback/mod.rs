//! Playback session control and playlist sequencing

pub mod commit;
pub mod controller;
pub mod library;
pub mod manager;
pub mod playlist;
pub mod session;

pub use commit::{Commit, Notice, ProgressRecord};
pub use controller::{PlaybackController, PlaybackSnapshot};
pub use library::MediaLibrary;
pub use manager::{Collaborators, PlaybackManager};
pub use playlist::Playlist;
pub use session::PlaybackSession;
