//! Post-commit work produced by controller mutations
//!
//! The controller never talks to collaborators. Each accepted mutation
//! appends what should happen next to an outbox. The manager broadcasts the
//! events while it still holds the controller lock and runs everything else
//! once the lock is released.

use playman_common::events::{PlaymanEvent, ToastLevel};
use playman_common::{EpisodeRef, MediaId, QueryKey};

/// User-facing notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: ToastLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }
}

/// Progress to hand to the persistence collaborator
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    pub media_id: MediaId,
    pub episode: EpisodeRef,
    pub position_seconds: f64,
}

/// Post-commit work, in the order the manager runs it
#[derive(Debug, Default)]
pub struct Commit {
    /// State-change events for the event bus
    pub events: Vec<PlaymanEvent>,
    /// Progress to persist
    pub progress: Option<ProgressRecord>,
    /// Cached views to invalidate
    pub invalidate: Vec<QueryKey>,
    /// Notices for the user
    pub notices: Vec<Notice>,
}

impl Commit {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
            && self.progress.is_none()
            && self.invalidate.is_empty()
            && self.notices.is_empty()
    }

    pub(crate) fn event(&mut self, event: PlaymanEvent) {
        self.events.push(event);
    }
}
