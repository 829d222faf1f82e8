//! HTTP request handlers
//!
//! Successful responses are wrapped as `{"data": ...}`, failures as
//! `{"error": "..."}` with a status derived from the error kind:
//! not found 404, invalid state 409, validation 400, anything else 500.

use crate::api::server::AppContext;
use crate::db;
use crate::error::{Error, ErrorKind};
use crate::hooks::OfflineStatus;
use crate::playback::PlaybackSnapshot;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use playman_common::{EpisodeRef, LocalFile, MediaId, QueryKey};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPlaybackRequest {
    media_id: MediaId,
    episode_number: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProgressRequest {
    media_id: MediaId,
    /// Position in seconds
    position: f64,
}

/// Either explicit items or the id of a saved playlist
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartPlaylistRequest {
    #[serde(default)]
    items: Vec<EpisodeRef>,
    #[serde(default)]
    playlist_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePlaylistRequest {
    name: String,
    items: Vec<EpisodeRef>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OfflineStatusBody {
    offline: bool,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<Json<DataResponse<T>>, ApiError>;

fn data<T>(data: T) -> Json<DataResponse<T>> {
    Json(DataResponse { data })
}

fn api_error(context: &str, e: Error) -> ApiError {
    let status = match e.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidState => StatusCode::CONFLICT,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("{} failed: {}", context, e);
    } else {
        warn!("{} rejected: {}", context, e);
    }

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "playman-server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Playback Manager Endpoints
// ============================================================================

/// POST /playback-manager/start - Play one library episode
pub async fn start_playback(
    State(ctx): State<AppContext>,
    Json(req): Json<StartPlaybackRequest>,
) -> ApiResult<MediaId> {
    info!(
        "Start playback request: media {} episode {}",
        req.media_id, req.episode_number
    );
    ctx.manager
        .start_playback(req.media_id, req.episode_number)
        .await
        .map(data)
        .map_err(|e| api_error("Start playback", e))
}

/// POST /playback-manager/stop
pub async fn stop_playback(State(ctx): State<AppContext>) -> ApiResult<bool> {
    ctx.manager
        .stop_playback()
        .await
        .map(data)
        .map_err(|e| api_error("Stop playback", e))
}

/// GET /playback-manager/state
pub async fn get_playback_state(
    State(ctx): State<AppContext>,
) -> Json<DataResponse<PlaybackSnapshot>> {
    data(ctx.manager.snapshot().await)
}

/// POST /playback-manager/sync-current-progress
///
/// Returns the media id so clients can refresh views that depend on it.
pub async fn sync_current_progress(
    State(ctx): State<AppContext>,
    Json(req): Json<SyncProgressRequest>,
) -> ApiResult<MediaId> {
    ctx.manager
        .sync_progress(req.media_id, req.position)
        .await
        .map(data)
        .map_err(|e| api_error("Sync progress", e))
}

/// POST /playback-manager/play-next
pub async fn play_next_episode(State(ctx): State<AppContext>) -> ApiResult<bool> {
    info!("Play next episode request");
    ctx.manager
        .play_next_episode()
        .await
        .map(data)
        .map_err(|e| api_error("Play next episode", e))
}

/// POST /playback-manager/start-playlist
pub async fn start_playlist(
    State(ctx): State<AppContext>,
    Json(req): Json<StartPlaylistRequest>,
) -> ApiResult<bool> {
    let items = match req.playlist_id {
        Some(id) => {
            info!("Start playlist request for saved playlist {}", id);
            db::playlists::get_playlist(&ctx.db_pool, id)
                .await
                .map_err(|e| api_error("Start playlist", e))?
                .items
        }
        None => req.items,
    };

    ctx.manager
        .start_playlist(items)
        .await
        .map(data)
        .map_err(|e| api_error("Start playlist", e))
}

/// POST /playback-manager/cancel-playlist
pub async fn cancel_current_playlist(State(ctx): State<AppContext>) -> ApiResult<bool> {
    info!("Cancel playlist request");
    ctx.manager
        .cancel_current_playlist()
        .await
        .map(data)
        .map_err(|e| api_error("Cancel playlist", e))
}

/// POST /playback-manager/playlist-next
pub async fn playlist_next(State(ctx): State<AppContext>) -> ApiResult<bool> {
    info!("Playlist next request");
    ctx.manager
        .playlist_next()
        .await
        .map(data)
        .map_err(|e| api_error("Playlist next", e))
}

/// GET /playback-manager/progress/:media_id - Last persisted progress
pub async fn get_progress(
    State(ctx): State<AppContext>,
    Path(media_id): Path<MediaId>,
) -> ApiResult<Option<db::progress::StoredProgress>> {
    db::progress::get_progress(&ctx.db_pool, media_id)
        .await
        .map(data)
        .map_err(|e| api_error("Get progress", e))
}

// ============================================================================
// Saved Playlist Endpoints
// ============================================================================

/// GET /playlists
pub async fn list_playlists(
    State(ctx): State<AppContext>,
) -> ApiResult<Vec<db::playlists::SavedPlaylist>> {
    db::playlists::list_playlists(&ctx.db_pool)
        .await
        .map(data)
        .map_err(|e| api_error("List playlists", e))
}

/// POST /playlists
pub async fn create_playlist(
    State(ctx): State<AppContext>,
    Json(req): Json<CreatePlaylistRequest>,
) -> ApiResult<i64> {
    let id = db::playlists::create_playlist(&ctx.db_pool, &req.name, &req.items)
        .await
        .map_err(|e| api_error("Create playlist", e))?;

    ctx.manager.invalidate(QueryKey::Playlists).await;
    Ok(data(id))
}

/// DELETE /playlists/:id
pub async fn delete_playlist(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> ApiResult<bool> {
    db::playlists::delete_playlist(&ctx.db_pool, id)
        .await
        .map_err(|e| api_error("Delete playlist", e))?;

    ctx.manager.invalidate(QueryKey::Playlists).await;
    Ok(data(true))
}

// ============================================================================
// Library Endpoints
// ============================================================================

/// GET /library/local-files
pub async fn list_local_files(State(ctx): State<AppContext>) -> Json<DataResponse<Vec<LocalFile>>> {
    data(ctx.manager.local_files().await)
}

/// GET /library/local-files/:media_id - One media's files in episode order
pub async fn list_media_files(
    State(ctx): State<AppContext>,
    Path(media_id): Path<MediaId>,
) -> Json<DataResponse<Vec<LocalFile>>> {
    data(ctx.manager.media_files(media_id).await)
}

/// POST /library/local-files
pub async fn add_local_file(
    State(ctx): State<AppContext>,
    Json(file): Json<LocalFile>,
) -> ApiResult<bool> {
    ctx.manager.add_local_file(file).await;
    ctx.manager.invalidate(QueryKey::LibraryCollection).await;
    Ok(data(true))
}

// ============================================================================
// Offline Mode Endpoints
// ============================================================================

/// GET /offline
pub async fn get_offline(State(ctx): State<AppContext>) -> Json<DataResponse<OfflineStatusBody>> {
    data(OfflineStatusBody {
        offline: ctx.state.is_offline(),
    })
}

/// POST /offline
pub async fn set_offline(
    State(ctx): State<AppContext>,
    Json(req): Json<OfflineStatusBody>,
) -> Json<DataResponse<OfflineStatusBody>> {
    let previous = ctx.state.set_offline(req.offline);
    if previous != req.offline {
        info!("Offline mode {}", if req.offline { "enabled" } else { "disabled" });
    }
    data(OfflineStatusBody {
        offline: req.offline,
    })
}
