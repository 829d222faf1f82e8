//! Post-commit collaborators
//!
//! Interfaces the playback manager calls after a mutation is committed, and
//! the implementations the server wires in:
//! - `CacheInvalidator`: publishes `InvalidateQueries` on the event bus
//! - `NotificationSink`: publishes `Toast` on the event bus
//! - `ProgressStore`: persists progress to SQLite
//! - `OfflineStatus`: implemented by `SharedState`

use crate::db;
use crate::error::Result;
use crate::playback::commit::{Notice, ProgressRecord};
use crate::state::SharedState;
use async_trait::async_trait;
use playman_common::events::PlaymanEvent;
use playman_common::QueryKey;
use sqlx::{Pool, Sqlite};
use std::sync::Arc;
use tracing::debug;

/// Invalidates cached views keyed by logical resource identifiers
#[async_trait]
pub trait CacheInvalidator: Send + Sync {
    async fn invalidate(&self, key: &QueryKey) -> Result<()>;
}

/// Delivers user-facing notices
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notice: &Notice) -> Result<()>;
}

/// Persists synced progress
#[async_trait]
pub trait ProgressStore: Send + Sync {
    async fn record(&self, record: &ProgressRecord) -> Result<()>;
}

/// Reports whether the service runs detached from the remote library
pub trait OfflineStatus: Send + Sync {
    fn is_offline(&self) -> bool;
}

/// Cache invalidation over the SSE event bus
pub struct EventBusInvalidator {
    state: Arc<SharedState>,
}

impl EventBusInvalidator {
    pub fn new(state: Arc<SharedState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl CacheInvalidator for EventBusInvalidator {
    async fn invalidate(&self, key: &QueryKey) -> Result<()> {
        debug!("Invalidating {}", key);
        self.state
            .broadcast_event(PlaymanEvent::invalidate(key.clone()));
        Ok(())
    }
}

/// Toast notices over the SSE event bus
pub struct EventBusNotifier {
    state: Arc<SharedState>,
}

impl EventBusNotifier {
    pub fn new(state: Arc<SharedState>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl NotificationSink for EventBusNotifier {
    async fn notify(&self, notice: &Notice) -> Result<()> {
        self.state.broadcast_event(PlaymanEvent::Toast {
            level: notice.level,
            message: notice.message.clone(),
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }
}

/// Progress persistence in the `playback_progress` table
pub struct SqliteProgressStore {
    db_pool: Pool<Sqlite>,
}

impl SqliteProgressStore {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ProgressStore for SqliteProgressStore {
    async fn record(&self, record: &ProgressRecord) -> Result<()> {
        db::progress::record_progress(&self.db_pool, record).await
    }
}
