//! Integration tests for the playman-server HTTP API
//!
//! Drives the router in-process with an in-memory database:
//! - Health check
//! - Playback manager endpoints and error status mapping
//! - Saved playlists
//! - Local library and offline mode
//! - SSE event stream

mod helpers;

use axum::http::StatusCode;
use helpers::{episode, library};
use playman_server::api::{create_router, AppContext};
use playman_server::db;
use playman_server::hooks::{EventBusInvalidator, EventBusNotifier, SqliteProgressStore};
use playman_server::playback::{Collaborators, PlaybackManager};
use playman_server::SharedState;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Router wired the same way as the binary, backed by `sqlite::memory:`
async fn setup_test_server() -> (axum::Router, AppContext) {
    let db_pool = db::init::open_in_memory()
        .await
        .expect("Failed to open in-memory database");
    let state = Arc::new(SharedState::new(false));

    let collaborators = Collaborators {
        invalidator: Arc::new(EventBusInvalidator::new(Arc::clone(&state))),
        notifier: Arc::new(EventBusNotifier::new(Arc::clone(&state))),
        offline: state.clone(),
        progress_store: Some(Arc::new(SqliteProgressStore::new(db_pool.clone()))),
    };
    let manager = Arc::new(PlaybackManager::new(
        library(),
        collaborators,
        Arc::clone(&state),
        Duration::from_millis(500),
    ));

    let ctx = AppContext {
        state,
        manager,
        db_pool,
    };
    (create_router(ctx.clone()), ctx)
}

/// Helper function to make HTTP requests to the test server
async fn make_request(
    app: &axum::Router,
    method: &str,
    path: &str,
    body: Option<Value>,
) -> (StatusCode, Option<Value>) {
    use axum::body::Body;
    use http::{Method, Request};
    use tower::ServiceExt;

    let method = match method {
        "GET" => Method::GET,
        "POST" => Method::POST,
        "DELETE" => Method::DELETE,
        _ => panic!("Unsupported method"),
    };

    let request = Request::builder().method(method).uri(path);
    let request = match body {
        Some(json_body) => request
            .header("content-type", "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json_body = if !body.is_empty() {
        Some(serde_json::from_slice(&body).unwrap())
    } else {
        None
    };

    (status, json_body)
}

fn episode_json(media_id: i32, number: u32) -> Value {
    serde_json::to_value(episode(media_id, number)).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = setup_test_server().await;

    let (status, body) = make_request(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.expect("Expected response body");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "playman-server");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_playback_and_progress_sync() {
    let (app, _) = setup_test_server().await;

    let (status, body) = make_request(
        &app,
        "POST",
        "/api/v1/playback-manager/start",
        Some(json!({"mediaId": 10, "episodeNumber": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["data"], 10);

    let (status, body) = make_request(
        &app,
        "POST",
        "/api/v1/playback-manager/sync-current-progress",
        Some(json!({"mediaId": 10, "position": 321.5})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["data"], 10);

    let (status, body) =
        make_request(&app, "GET", "/api/v1/playback-manager/state", None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body.unwrap()["data"];
    assert_eq!(data["session"]["mediaId"], 10);
    assert_eq!(data["session"]["positionSeconds"], 321.5);
    assert_eq!(data["playlistCursor"], -1);

    // Persisted through the progress store
    let (status, body) =
        make_request(&app, "GET", "/api/v1/playback-manager/progress/10", None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body.unwrap()["data"];
    assert_eq!(data["positionSeconds"], 321.5);
    assert_eq!(data["episode"]["episodeNumber"], 1);
}

#[tokio::test]
async fn test_error_status_mapping() {
    let (app, _) = setup_test_server().await;

    // Not found: no session for this media
    let (status, body) = make_request(
        &app,
        "POST",
        "/api/v1/playback-manager/sync-current-progress",
        Some(json!({"mediaId": 99, "position": 1.0})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.unwrap()["error"].is_string());

    // Invalid state: nothing playing
    let (status, _) =
        make_request(&app, "POST", "/api/v1/playback-manager/play-next", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Validation: empty playlist
    let (status, _) = make_request(
        &app,
        "POST",
        "/api/v1/playback-manager/start-playlist",
        Some(json!({"items": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_playlist_lifecycle_over_http() {
    let (app, _) = setup_test_server().await;

    let (status, _) = make_request(
        &app,
        "POST",
        "/api/v1/playback-manager/start-playlist",
        Some(json!({"items": [episode_json(10, 1), episode_json(20, 1)]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        make_request(&app, "POST", "/api/v1/playback-manager/playlist-next", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["data"], true);

    let (status, _) =
        make_request(&app, "POST", "/api/v1/playback-manager/playlist-next", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, body) = make_request(&app, "GET", "/api/v1/playback-manager/state", None).await;
    let data = &body.unwrap()["data"];
    assert!(data["session"].is_null());
    assert_eq!(data["playlistCursor"], -1);

    // Cancel with nothing active
    let (status, _) =
        make_request(&app, "POST", "/api/v1/playback-manager/cancel-playlist", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_saved_playlists() {
    let (app, ctx) = setup_test_server().await;
    let mut rx = ctx.state.subscribe_events();

    let (status, body) = make_request(
        &app,
        "POST",
        "/api/v1/playlists",
        Some(json!({"name": "Weekend", "items": [episode_json(10, 2), episode_json(10, 3)]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body.unwrap()["data"].as_i64().unwrap();

    let (_, body) = make_request(&app, "GET", "/api/v1/playlists", None).await;
    let playlists = body.unwrap()["data"].as_array().unwrap().clone();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0]["name"], "Weekend");

    // Start by id
    let (status, _) = make_request(
        &app,
        "POST",
        "/api/v1/playback-manager/start-playlist",
        Some(json!({"playlistId": id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let snapshot = ctx.manager.snapshot().await;
    assert_eq!(snapshot.session.unwrap().episode, episode(10, 2));

    let (status, _) =
        make_request(&app, "DELETE", &format!("/api/v1/playlists/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        make_request(&app, "DELETE", &format!("/api/v1/playlists/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Listing invalidated on create, start and delete
    let mut invalidations = 0;
    while let Ok(event) = rx.try_recv() {
        if let playman_common::events::PlaymanEvent::InvalidateQueries { key, .. } = event {
            if key == playman_common::QueryKey::Playlists {
                invalidations += 1;
            }
        }
    }
    assert_eq!(invalidations, 3);
}

#[tokio::test]
async fn test_local_files_and_offline_mode() {
    let (app, _) = setup_test_server().await;

    let (_, body) = make_request(&app, "GET", "/api/v1/library/local-files", None).await;
    assert_eq!(body.unwrap()["data"].as_array().unwrap().len(), 5);

    let (status, _) = make_request(
        &app,
        "POST",
        "/api/v1/library/local-files",
        Some(json!({"mediaId": 20, "episodeNumber": 3, "path": "/anime/20/03.mkv"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = make_request(&app, "GET", "/api/v1/library/local-files", None).await;
    assert_eq!(body.unwrap()["data"].as_array().unwrap().len(), 6);

    let (_, body) = make_request(&app, "GET", "/api/v1/offline", None).await;
    assert_eq!(body.unwrap()["data"]["offline"], false);

    let (status, body) = make_request(
        &app,
        "POST",
        "/api/v1/offline",
        Some(json!({"offline": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.unwrap()["data"]["offline"], true);

    // Offline sessions are flagged
    make_request(
        &app,
        "POST",
        "/api/v1/playback-manager/start",
        Some(json!({"mediaId": 20, "episodeNumber": 3})),
    )
    .await;
    let (_, body) = make_request(&app, "GET", "/api/v1/playback-manager/state", None).await;
    assert_eq!(body.unwrap()["data"]["session"]["isOffline"], true);
}

#[tokio::test]
async fn test_media_files_endpoint() {
    let (app, _) = setup_test_server().await;

    let (status, body) =
        make_request(&app, "GET", "/api/v1/library/local-files/10", None).await;
    assert_eq!(status, StatusCode::OK);
    let files = body.unwrap()["data"].as_array().unwrap().clone();
    let numbers: Vec<u64> = files
        .iter()
        .map(|f| f["episodeNumber"].as_u64().unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);

    let (_, body) = make_request(&app, "GET", "/api/v1/library/local-files/404", None).await;
    assert!(body.unwrap()["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_event_stream_delivers_invalidations() {
    use axum::body::Body;
    use futures::StreamExt;
    use http::Request;
    use tower::ServiceExt;

    let (app, ctx) = setup_test_server().await;
    ctx.manager.start_playback(10, 1).await.unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/events")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    // The handler has subscribed by the time the response is returned
    ctx.manager.sync_progress(10, 90.0).await.unwrap();

    let mut stream = response.into_body().into_data_stream();
    let mut received = String::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !received.contains("anime-entries-get-anime-entry") {
        let chunk = tokio::time::timeout_at(deadline, stream.next())
            .await
            .expect("Timed out waiting for SSE events")
            .expect("SSE stream ended")
            .unwrap();
        received.push_str(&String::from_utf8_lossy(&chunk));
    }

    assert!(received.contains("event: ProgressSynced"));
    assert!(received.contains("event: InvalidateQueries"));
}
