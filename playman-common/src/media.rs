//! Media and episode references

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Media identifier (tracking-provider numeric id)
pub type MediaId = i32;

/// Reference to a single playable unit (one episode file of one media)
///
/// Opaque to the playback state machine: it is stored, compared and handed
/// back, never interpreted beyond `media_id` and `episode_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRef {
    pub media_id: MediaId,
    pub episode_number: u32,
    pub path: PathBuf,
}

impl EpisodeRef {
    pub fn new(media_id: MediaId, episode_number: u32, path: impl Into<PathBuf>) -> Self {
        Self {
            media_id,
            episode_number,
            path: path.into(),
        }
    }
}

impl fmt::Display for EpisodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "media {} episode {} ({})",
            self.media_id,
            self.episode_number,
            self.path.display()
        )
    }
}

/// Library record for a local episode file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalFile {
    pub media_id: MediaId,
    pub episode_number: u32,
    pub path: PathBuf,
}

impl From<&LocalFile> for EpisodeRef {
    fn from(file: &LocalFile) -> Self {
        EpisodeRef::new(file.media_id, file.episode_number, file.path.clone())
    }
}
