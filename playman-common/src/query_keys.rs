//! Cache query keys
//!
//! Logical identifiers of cached UI views. The playback manager publishes
//! these after a successful mutation so that clients drop stale data.

use crate::media::MediaId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cached view that can be invalidated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum QueryKey {
    /// A single library entry
    #[serde(rename_all = "camelCase")]
    AnimeEntry { media_id: MediaId },
    /// The user's local library collection
    LibraryCollection,
    /// The upstream tracking-provider collection
    AnilistCollection,
    /// Latest offline snapshot
    OfflineSnapshot,
    /// Saved playlist listing
    Playlists,
}

impl QueryKey {
    /// Key path as sent to clients, e.g. `["anime-entries-get-anime-entry", "21"]`
    pub fn path(&self) -> Vec<String> {
        match self {
            QueryKey::AnimeEntry { media_id } => vec![
                "anime-entries-get-anime-entry".to_string(),
                media_id.to_string(),
            ],
            QueryKey::LibraryCollection => {
                vec!["anime-collection-get-library-collection".to_string()]
            }
            QueryKey::AnilistCollection => vec!["anilist-get-anilist-collection".to_string()],
            QueryKey::OfflineSnapshot => vec!["offline-get-offline-snapshot".to_string()],
            QueryKey::Playlists => vec!["playlist-get-playlists".to_string()],
        }
    }

    /// Keys invalidated after a progress sync
    ///
    /// Online: the entry, the library collection and the tracking collection.
    /// Offline: the offline snapshot only.
    pub fn after_progress_sync(media_id: MediaId, offline: bool) -> Vec<QueryKey> {
        if offline {
            vec![QueryKey::OfflineSnapshot]
        } else {
            vec![
                QueryKey::AnimeEntry { media_id },
                QueryKey::LibraryCollection,
                QueryKey::AnilistCollection,
            ]
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().join("/"))
    }
}
