//! Local media library
//!
//! Indexes local episode files by media id so the controller can resolve
//! "next episode of the same media". Loaded from a JSON manifest:
//!
//! ```json
//! [
//!   { "mediaId": 21, "episodeNumber": 1, "path": "/anime/One Piece/001.mkv" }
//! ]
//! ```

use crate::error::Result;
use playman_common::{EpisodeRef, LocalFile, MediaId};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Episode files grouped by media, each group sorted by episode number
#[derive(Debug, Clone, Default)]
pub struct MediaLibrary {
    files: BTreeMap<MediaId, Vec<LocalFile>>,
}

impl MediaLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from a list of files
    pub fn from_files(files: impl IntoIterator<Item = LocalFile>) -> Self {
        let mut library = Self::new();
        for file in files {
            library.add(file);
        }
        library
    }

    /// Load the JSON manifest at `path`
    ///
    /// A missing manifest yields an empty library. A manifest that exists but
    /// does not parse is an error.
    pub fn load_manifest(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Library manifest {} not found, starting with an empty library",
                path.display()
            );
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path)?;
        let files: Vec<LocalFile> = serde_json::from_str(&content)?;
        let library = Self::from_files(files);
        info!(
            "Loaded {} local files for {} media from {}",
            library.file_count(),
            library.media_count(),
            path.display()
        );
        Ok(library)
    }

    /// Add a file, replacing any existing file for the same episode
    pub fn add(&mut self, file: LocalFile) {
        let group = self.files.entry(file.media_id).or_default();
        match group.binary_search_by_key(&file.episode_number, |f| f.episode_number) {
            Ok(index) => group[index] = file,
            Err(index) => group.insert(index, file),
        }
    }

    /// Look up a specific episode
    pub fn episode(&self, media_id: MediaId, episode_number: u32) -> Option<EpisodeRef> {
        self.files
            .get(&media_id)?
            .iter()
            .find(|f| f.episode_number == episode_number)
            .map(EpisodeRef::from)
    }

    /// First episode of the same media numbered after `current`
    pub fn next_episode(&self, current: &EpisodeRef) -> Option<EpisodeRef> {
        self.files
            .get(&current.media_id)?
            .iter()
            .find(|f| f.episode_number > current.episode_number)
            .map(EpisodeRef::from)
    }

    /// Files of one media in episode order
    pub fn files(&self, media_id: MediaId) -> &[LocalFile] {
        self.files.get(&media_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every file, grouped by media id then episode number
    pub fn all_files(&self) -> Vec<LocalFile> {
        self.files.values().flatten().cloned().collect()
    }

    pub fn media_count(&self) -> usize {
        self.files.len()
    }

    pub fn file_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file(media_id: MediaId, episode_number: u32) -> LocalFile {
        LocalFile {
            media_id,
            episode_number,
            path: format!("/anime/{}/{:02}.mkv", media_id, episode_number).into(),
        }
    }

    #[test]
    fn test_next_episode_skips_gaps() {
        let library = MediaLibrary::from_files(vec![file(1, 1), file(1, 2), file(1, 5)]);

        let ep2 = library.episode(1, 2).unwrap();
        let next = library.next_episode(&ep2).unwrap();
        assert_eq!(next.episode_number, 5);

        let ep5 = library.episode(1, 5).unwrap();
        assert!(library.next_episode(&ep5).is_none());
    }

    #[test]
    fn test_next_episode_stays_within_media() {
        let library = MediaLibrary::from_files(vec![file(1, 1), file(2, 2)]);
        let ep1 = library.episode(1, 1).unwrap();
        assert!(library.next_episode(&ep1).is_none());
    }

    #[test]
    fn test_add_keeps_order_and_replaces_duplicates() {
        let mut library = MediaLibrary::new();
        library.add(file(7, 3));
        library.add(file(7, 1));
        library.add(file(7, 2));
        library.add(LocalFile {
            path: "/other/01.mkv".into(),
            ..file(7, 1)
        });

        let numbers: Vec<u32> = library.files(7).iter().map(|f| f.episode_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(library.files(7)[0].path, Path::new("/other/01.mkv"));
        assert_eq!(library.file_count(), 3);
    }

    #[test]
    fn test_missing_manifest_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let library = MediaLibrary::load_manifest(&dir.path().join("library.json")).unwrap();
        assert_eq!(library.file_count(), 0);
    }

    #[test]
    fn test_manifest_load() {
        let mut manifest = tempfile::NamedTempFile::new().unwrap();
        write!(
            manifest,
            r#"[
                {{"mediaId": 21, "episodeNumber": 2, "path": "/op/002.mkv"}},
                {{"mediaId": 21, "episodeNumber": 1, "path": "/op/001.mkv"}}
            ]"#
        )
        .unwrap();

        let library = MediaLibrary::load_manifest(manifest.path()).unwrap();
        assert_eq!(library.media_count(), 1);
        assert_eq!(library.files(21)[0].episode_number, 1);
    }

    #[test]
    fn test_malformed_manifest_is_error() {
        let mut manifest = tempfile::NamedTempFile::new().unwrap();
        write!(manifest, "not json").unwrap();
        assert!(MediaLibrary::load_manifest(manifest.path()).is_err());
    }
}
