//! Playlist Curator Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod curation;
pub mod intent;
pub mod playlist_store;
pub mod ruleset;

// Re-export commonly used types for convenience
pub use catalog::{CatalogClient, SpotifyClient};
pub use curation::{GenerationError, GenerationRequest, PlaylistCreated, PlaylistGenerator};
pub use intent::{IntentHandler, IntentOutcome};
pub use playlist_store::{PlaylistRecordStore, SqlitePlaylistStore};
pub use ruleset::{RulesetStore, SqliteRulesetStore};
