//! Playman Server (playman-server) - Main entry point
//!
//! Playback manager service: serves playback control, saved playlists, the
//! local library and an SSE event stream over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use playman_common::config::TomlConfig;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playman_server::api::{self, AppContext};
use playman_server::config::Config;
use playman_server::db;
use playman_server::hooks::{EventBusInvalidator, EventBusNotifier, SqliteProgressStore};
use playman_server::playback::{Collaborators, MediaLibrary, PlaybackManager};
use playman_server::SharedState;

/// Command-line arguments for playman-server
#[derive(Parser, Debug)]
#[command(name = "playman-server")]
#[command(about = "Playback session manager service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "PLAYMAN_PORT")]
    port: Option<u16>,

    /// Root folder holding the database and library manifest
    #[arg(short, long, env = "PLAYMAN_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,

    /// TOML config file (defaults to the OS config directory)
    #[arg(short, long, env = "PLAYMAN_CONFIG")]
    config: Option<PathBuf>,

    /// Start in offline mode
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration file")?;
    let config = Config::from_sources(args.port, args.root_folder.as_deref(), args.offline, toml);

    // Initialize tracing; RUST_LOG takes precedence over the config file
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("playman_server={},tower_http=debug", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting playman-server on port {}", config.port);
    info!("Root folder: {}", config.root_folder.display());
    info!("Offline mode: {}", config.offline);

    let db_pool = db::init::open(&config.database_path)
        .await
        .context("Failed to open database")?;

    let library = MediaLibrary::load_manifest(&config.library_manifest())
        .context("Failed to load library manifest")?;
    info!(
        "Library loaded: {} media, {} files",
        library.media_count(),
        library.file_count()
    );

    let state = Arc::new(SharedState::new(config.offline));

    let collaborators = Collaborators {
        invalidator: Arc::new(EventBusInvalidator::new(Arc::clone(&state))),
        notifier: Arc::new(EventBusNotifier::new(Arc::clone(&state))),
        offline: state.clone(),
        progress_store: Some(Arc::new(SqliteProgressStore::new(db_pool.clone()))),
    };

    let manager = Arc::new(PlaybackManager::new(
        library,
        collaborators,
        Arc::clone(&state),
        config.hook_timeout,
    ));

    let ctx = AppContext {
        state,
        manager,
        db_pool,
    };

    api::server::run(config.port, ctx, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
