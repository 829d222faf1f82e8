//! Saved playlists
//!
//! Named, ordered lists of episodes the user can start later. Items are
//! stored as a JSON array in a single column.

use crate::error::{Error, Result};
use playman_common::EpisodeRef;
use serde::Serialize;
use sqlx::{Pool, Sqlite};
use tracing::info;

/// Saved playlist row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlaylist {
    pub id: i64,
    pub name: String,
    pub items: Vec<EpisodeRef>,
    pub created_at: String,
}

type PlaylistRow = (i64, String, String, String);

fn from_row((id, name, items_json, created_at): PlaylistRow) -> Result<SavedPlaylist> {
    Ok(SavedPlaylist {
        id,
        name,
        items: serde_json::from_str(&items_json)?,
        created_at,
    })
}

/// All saved playlists, oldest first
pub async fn list_playlists(db: &Pool<Sqlite>) -> Result<Vec<SavedPlaylist>> {
    let rows = sqlx::query_as::<_, PlaylistRow>(
        "SELECT id, name, items_json, created_at FROM playlists ORDER BY id ASC",
    )
    .fetch_all(db)
    .await?;

    rows.into_iter().map(from_row).collect()
}

/// One saved playlist
pub async fn get_playlist(db: &Pool<Sqlite>, id: i64) -> Result<SavedPlaylist> {
    let row = sqlx::query_as::<_, PlaylistRow>(
        "SELECT id, name, items_json, created_at FROM playlists WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(db)
    .await?
    .ok_or(Error::PlaylistNotFound(id))?;

    from_row(row)
}

/// Save a playlist, returning its id
pub async fn create_playlist(db: &Pool<Sqlite>, name: &str, items: &[EpisodeRef]) -> Result<i64> {
    if items.is_empty() {
        return Err(Error::EmptyPlaylist);
    }

    let items_json = serde_json::to_string(items)?;
    let result = sqlx::query("INSERT INTO playlists (name, items_json, created_at) VALUES (?, ?, ?)")
        .bind(name)
        .bind(items_json)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(db)
        .await?;

    let id = result.last_insert_rowid();
    info!("Saved playlist {} '{}' with {} items", id, name, items.len());
    Ok(id)
}

/// Delete a playlist
pub async fn delete_playlist(db: &Pool<Sqlite>, id: i64) -> Result<()> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::PlaylistNotFound(id));
    }
    info!("Deleted playlist {}", id);
    Ok(())
}
