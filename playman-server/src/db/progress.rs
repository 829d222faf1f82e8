//! Playback progress persistence
//!
//! One row per media: the last episode watched and the position reached.

use crate::error::{Error, Result};
use crate::playback::commit::ProgressRecord;
use playman_common::{EpisodeRef, MediaId};
use serde::Serialize;
use sqlx::{Pool, Sqlite};
use tracing::debug;

/// Stored progress row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProgress {
    pub episode: EpisodeRef,
    pub position_seconds: f64,
    pub updated_at: String,
}

/// Upsert the progress of one media (last write wins)
pub async fn record_progress(db: &Pool<Sqlite>, record: &ProgressRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO playback_progress (media_id, episode_number, file_path, position_seconds, updated_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(media_id) DO UPDATE SET
            episode_number = excluded.episode_number,
            file_path = excluded.file_path,
            position_seconds = excluded.position_seconds,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(record.media_id)
    .bind(record.episode.episode_number as i64)
    .bind(record.episode.path.to_string_lossy().to_string())
    .bind(record.position_seconds)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(db)
    .await?;

    debug!(
        "Persisted progress for media {}: {:.1}s",
        record.media_id, record.position_seconds
    );
    Ok(())
}

/// Load the stored progress of one media
pub async fn get_progress(db: &Pool<Sqlite>, media_id: MediaId) -> Result<Option<StoredProgress>> {
    let row = sqlx::query_as::<_, (i64, String, f64, String)>(
        r#"
        SELECT episode_number, file_path, position_seconds, updated_at
        FROM playback_progress
        WHERE media_id = ?
        "#,
    )
    .bind(media_id)
    .fetch_optional(db)
    .await?;

    let Some((episode_number, file_path, position_seconds, updated_at)) = row else {
        return Ok(None);
    };

    let episode_number = u32::try_from(episode_number).map_err(|_| {
        Error::Internal(format!(
            "Invalid episode number {} stored for media {}",
            episode_number, media_id
        ))
    })?;

    Ok(Some(StoredProgress {
        episode: EpisodeRef::new(media_id, episode_number, file_path),
        position_seconds,
        updated_at,
    }))
}
