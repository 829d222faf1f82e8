//! # Playman Server Library (playman-server)
//!
//! Playback manager service: owns the current playback session and an
//! optional playlist, accepts progress syncs, advances episodes and playlist
//! items, and publishes cache invalidations and notices to UI clients after
//! each committed change.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod hooks;
pub mod playback;
pub mod state;

pub use error::{Error, ErrorKind, Result};
pub use state::SharedState;
