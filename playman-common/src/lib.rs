//! # Playman Common Library
//!
//! Shared code for the playback manager service and its clients:
//! - Event types (PlaymanEvent enum)
//! - Media and episode references
//! - Cache query keys invalidated after playback mutations
//! - Bootstrap configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod events;
pub mod media;
pub mod query_keys;

pub use error::{Error, Result};
pub use media::{EpisodeRef, LocalFile, MediaId};
pub use query_keys::QueryKey;
