//! HTTP server setup and routing
//!
//! Sets up the Axum HTTP server with routes for playback control, saved
//! playlists, the local library, offline mode and SSE.

use crate::error::{Error, Result};
use crate::playback::PlaybackManager;
use crate::state::SharedState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use sqlx::{Pool, Sqlite};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub state: Arc<SharedState>,
    pub manager: Arc<PlaybackManager>,
    pub db_pool: Pool<Sqlite>,
}

/// Build the application router
pub fn create_router(ctx: AppContext) -> Router {
    use super::handlers;

    Router::new()
        .route("/health", get(handlers::health))
        .nest(
            "/api/v1",
            Router::new()
                // Playback manager
                .route("/playback-manager/start", post(handlers::start_playback))
                .route("/playback-manager/stop", post(handlers::stop_playback))
                .route("/playback-manager/state", get(handlers::get_playback_state))
                .route(
                    "/playback-manager/sync-current-progress",
                    post(handlers::sync_current_progress),
                )
                .route("/playback-manager/play-next", post(handlers::play_next_episode))
                .route(
                    "/playback-manager/start-playlist",
                    post(handlers::start_playlist),
                )
                .route(
                    "/playback-manager/cancel-playlist",
                    post(handlers::cancel_current_playlist),
                )
                .route(
                    "/playback-manager/playlist-next",
                    post(handlers::playlist_next),
                )
                .route(
                    "/playback-manager/progress/:media_id",
                    get(handlers::get_progress),
                )
                // Saved playlists
                .route(
                    "/playlists",
                    get(handlers::list_playlists).post(handlers::create_playlist),
                )
                .route("/playlists/:id", delete(handlers::delete_playlist))
                // Local library
                .route(
                    "/library/local-files",
                    get(handlers::list_local_files).post(handlers::add_local_file),
                )
                .route(
                    "/library/local-files/:media_id",
                    get(handlers::list_media_files),
                )
                // Offline mode
                .route(
                    "/offline",
                    get(handlers::get_offline).post(handlers::set_offline),
                )
                // SSE event stream
                .route("/events", get(super::sse::event_stream)),
        )
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        // Enable CORS for local UI access
        .layer(CorsLayer::permissive())
}

/// Run HTTP API server until `shutdown` resolves
pub async fn run(
    port: u16,
    ctx: AppContext,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = create_router(ctx);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}
