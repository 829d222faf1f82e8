//! Shared service state
//!
//! Thread-safe state shared between the playback manager, its collaborators
//! and the HTTP handlers: the event bus and the offline-mode flag.

use crate::hooks::OfflineStatus;
use playman_common::events::PlaymanEvent;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// Shared state accessible by all components
pub struct SharedState {
    /// Event broadcaster for SSE events
    pub event_tx: broadcast::Sender<PlaymanEvent>,

    /// Offline mode flag
    offline: AtomicBool,
}

impl SharedState {
    /// Create new shared state
    pub fn new(offline: bool) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            event_tx,
            offline: AtomicBool::new(offline),
        }
    }

    /// Broadcast an event to all SSE listeners
    pub fn broadcast_event(&self, event: PlaymanEvent) {
        // Ignore send errors (no receivers is OK)
        let _ = self.event_tx.send(event);
    }

    /// Subscribe to event stream for SSE
    pub fn subscribe_events(&self) -> broadcast::Receiver<PlaymanEvent> {
        self.event_tx.subscribe()
    }

    /// Toggle offline mode, returns the previous value
    pub fn set_offline(&self, offline: bool) -> bool {
        let previous = self.offline.swap(offline, Ordering::SeqCst);
        if previous != offline {
            self.broadcast_event(PlaymanEvent::OfflineModeChanged {
                offline,
                timestamp: chrono::Utc::now(),
            });
        }
        previous
    }
}

impl OfflineStatus for SharedState {
    fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(false)
    }
}
