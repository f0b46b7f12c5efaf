//! Catalog client interface.
//!
//! The catalog (search, lookups, playlist writes) is an external service;
//! the generation pipeline only ever talks to it through this trait so
//! tests can substitute a scripted implementation.

use super::models::{
    Artist, ArtistDetail, CatalogItem, CreatedPlaylist, PlaylistSummary, Show,
};
use anyhow::Result;
use async_trait::async_trait;

/// Maximum number of item URIs one add-items call may carry. Larger batches
/// must be chunked by the caller.
pub const MAX_ITEMS_PER_ADD: usize = 100;

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch the user's top artists, most listened first.
    async fn get_top_artists(&self, limit: usize) -> Result<Vec<Artist>>;

    /// Fetch every artist the user follows.
    async fn get_followed_artists(&self) -> Result<Vec<Artist>>;

    /// Fetch one artist's full record (follower count, genres).
    async fn get_artist(&self, artist_id: &str) -> Result<ArtistDetail>;

    /// Fetch an artist's top tracks.
    async fn get_artist_top_tracks(&self, artist_id: &str) -> Result<Vec<CatalogItem>>;

    /// Fetch up to `limit` of the user's saved tracks.
    async fn get_saved_tracks(&self, limit: usize) -> Result<Vec<CatalogItem>>;

    /// Fetch the user's saved podcast shows.
    async fn get_saved_shows(&self) -> Result<Vec<Show>>;

    /// Search tracks by free-text query.
    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<CatalogItem>>;

    /// Search podcast episodes by free-text query.
    async fn search_episodes(&self, query: &str, limit: usize) -> Result<Vec<CatalogItem>>;

    /// Fetch a single track by id.
    async fn get_track(&self, track_id: &str) -> Result<CatalogItem>;

    /// Fetch a single episode by id.
    async fn get_episode(&self, episode_id: &str) -> Result<CatalogItem>;

    /// List the user's playlists.
    async fn get_user_playlists(&self) -> Result<Vec<PlaylistSummary>>;

    /// Fetch a playlist's items in playlist order.
    async fn get_playlist_items(&self, playlist_id: &str) -> Result<Vec<CatalogItem>>;

    /// Create a playlist and return its id and public URL.
    async fn create_playlist(
        &self,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<CreatedPlaylist>;

    /// Add item URIs to a playlist, optionally at a given position.
    ///
    /// Err if `uris` exceeds [`MAX_ITEMS_PER_ADD`].
    async fn add_items(
        &self,
        playlist_id: &str,
        uris: &[String],
        position: Option<usize>,
    ) -> Result<()>;

    /// Delete (unfollow) a playlist.
    async fn delete_playlist(&self, playlist_id: &str) -> Result<()>;
}
