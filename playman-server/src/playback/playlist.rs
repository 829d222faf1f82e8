//! Playlist sequencing
//!
//! A playlist only exists while active. The controller keeps it in an
//! `Option`, so the idle state (cursor -1 on the wire) is `None` and a live
//! playlist always has a cursor that indexes a real item.

use crate::error::{Error, Result};
use playman_common::EpisodeRef;

/// Ordered items plus the index of the one currently playing
#[derive(Debug, Clone, PartialEq)]
pub struct Playlist {
    items: Vec<EpisodeRef>,
    cursor: usize,
}

impl Playlist {
    /// Create a playlist positioned on its first item
    ///
    /// Fails with `EmptyPlaylist` when `items` is empty.
    pub fn new(items: Vec<EpisodeRef>) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::EmptyPlaylist);
        }
        Ok(Self { items, cursor: 0 })
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn items(&self) -> &[EpisodeRef] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item under the cursor
    pub fn current(&self) -> &EpisodeRef {
        &self.items[self.cursor]
    }

    /// True while at least one item remains after the cursor
    pub fn has_next(&self) -> bool {
        self.cursor + 1 < self.items.len()
    }

    /// Move the cursor forward by one
    ///
    /// Returns the new current item, or `None` without moving when the
    /// cursor is already on the last item.
    pub fn advance(&mut self) -> Option<&EpisodeRef> {
        if !self.has_next() {
            return None;
        }
        self.cursor += 1;
        Some(&self.items[self.cursor])
    }
}
