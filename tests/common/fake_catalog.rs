//! Scripted in-memory catalog client.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use playlist_curator::catalog::{
    Artist, ArtistDetail, CatalogClient, CatalogItem, CreatedPlaylist, PlaylistSummary, Show,
    MAX_ITEMS_PER_ADD,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// One recorded `add_items` call.
#[derive(Debug, Clone)]
pub struct AddCall {
    pub playlist_id: String,
    pub uris: Vec<String>,
    pub position: Option<usize>,
}

/// In-memory [`CatalogClient`] serving canned data.
///
/// Write operations are recorded so tests can assert on what a run did.
/// Created playlists become visible to later `get_user_playlists` calls and
/// deletions remove them again, so repeated runs against the same fake see
/// each other's leftovers the way they would against the real service.
#[derive(Default)]
pub struct FakeCatalogClient {
    followed_artists: Vec<Artist>,
    top_artists: Vec<Artist>,
    artist_details: HashMap<String, ArtistDetail>,
    artist_top_tracks: HashMap<String, Vec<CatalogItem>>,
    saved_tracks: Vec<CatalogItem>,
    saved_shows: Vec<Show>,
    tracks: HashMap<String, CatalogItem>,
    episodes: HashMap<String, CatalogItem>,
    playlist_items: HashMap<String, Vec<CatalogItem>>,

    playlists: Mutex<Vec<PlaylistSummary>>,
    created: Mutex<Vec<(String, String)>>,
    deleted: Mutex<Vec<String>>,
    added: Mutex<Vec<AddCall>>,
    next_playlist_id: AtomicUsize,
}

impl FakeCatalogClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a followed artist with a follower count and canned top tracks.
    /// The tracks also become fetchable by id.
    pub fn with_artist(
        mut self,
        artist: Artist,
        followers: u64,
        top_tracks: Vec<CatalogItem>,
    ) -> Self {
        self.artist_details.insert(
            artist.id.clone(),
            ArtistDetail {
                id: artist.id.clone(),
                name: artist.name.clone(),
                followers,
                genres: artist.genres.clone(),
            },
        );
        for track in &top_tracks {
            self.tracks.insert(track.id.clone(), track.clone());
        }
        self.artist_top_tracks.insert(artist.id.clone(), top_tracks);
        self.followed_artists.push(artist);
        self
    }

    /// Adds an existing playlist with canned items.
    pub fn with_playlist(mut self, id: &str, name: &str, items: Vec<CatalogItem>) -> Self {
        self.playlists.get_mut().unwrap().push(PlaylistSummary {
            id: id.to_string(),
            name: name.to_string(),
            owner: "tester".to_string(),
            tracks_total: items.len(),
        });
        self.playlist_items.insert(id.to_string(), items);
        self
    }

    pub fn with_saved_tracks(mut self, tracks: Vec<CatalogItem>) -> Self {
        for track in &tracks {
            self.tracks.insert(track.id.clone(), track.clone());
        }
        self.saved_tracks = tracks;
        self
    }

    pub fn with_saved_shows(mut self, shows: Vec<Show>) -> Self {
        self.saved_shows = shows;
        self
    }

    /// Names of playlists created during the test, in call order.
    pub fn created_names(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Ids of playlists deleted during the test, in call order.
    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn add_calls(&self) -> Vec<AddCall> {
        self.added.lock().unwrap().clone()
    }

    /// Every URI added to the playlist, flattened across chunked calls.
    pub fn uris_added_to(&self, playlist_id: &str) -> Vec<String> {
        self.added
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.playlist_id == playlist_id)
            .flat_map(|call| call.uris.iter().cloned())
            .collect()
    }
}

#[async_trait]
impl CatalogClient for FakeCatalogClient {
    async fn get_top_artists(&self, limit: usize) -> Result<Vec<Artist>> {
        Ok(self.top_artists.iter().take(limit).cloned().collect())
    }

    async fn get_followed_artists(&self) -> Result<Vec<Artist>> {
        Ok(self.followed_artists.clone())
    }

    async fn get_artist(&self, artist_id: &str) -> Result<ArtistDetail> {
        self.artist_details
            .get(artist_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown artist: {}", artist_id))
    }

    async fn get_artist_top_tracks(&self, artist_id: &str) -> Result<Vec<CatalogItem>> {
        Ok(self
            .artist_top_tracks
            .get(artist_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_saved_tracks(&self, limit: usize) -> Result<Vec<CatalogItem>> {
        Ok(self.saved_tracks.iter().take(limit).cloned().collect())
    }

    async fn get_saved_shows(&self) -> Result<Vec<Show>> {
        Ok(self.saved_shows.clone())
    }

    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<CatalogItem>> {
        let query = query.to_lowercase();
        Ok(self
            .tracks
            .values()
            .filter(|track| track.name.to_lowercase().contains(&query))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn search_episodes(&self, query: &str, limit: usize) -> Result<Vec<CatalogItem>> {
        let query = query.to_lowercase();
        Ok(self
            .episodes
            .values()
            .filter(|episode| episode.name.to_lowercase().contains(&query))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_track(&self, track_id: &str) -> Result<CatalogItem> {
        self.tracks
            .get(track_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown track: {}", track_id))
    }

    async fn get_episode(&self, episode_id: &str) -> Result<CatalogItem> {
        self.episodes
            .get(episode_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown episode: {}", episode_id))
    }

    async fn get_user_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        Ok(self.playlists.lock().unwrap().clone())
    }

    async fn get_playlist_items(&self, playlist_id: &str) -> Result<Vec<CatalogItem>> {
        Ok(self
            .playlist_items
            .get(playlist_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_playlist(
        &self,
        name: &str,
        _description: &str,
        _public: bool,
    ) -> Result<CreatedPlaylist> {
        let n = self.next_playlist_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("playlist-{}", n);
        self.playlists.lock().unwrap().push(PlaylistSummary {
            id: id.clone(),
            name: name.to_string(),
            owner: "tester".to_string(),
            tracks_total: 0,
        });
        self.created
            .lock()
            .unwrap()
            .push((id.clone(), name.to_string()));
        Ok(CreatedPlaylist {
            id: id.clone(),
            url: format!("https://open.spotify.com/playlist/{}", id),
        })
    }

    async fn add_items(
        &self,
        playlist_id: &str,
        uris: &[String],
        position: Option<usize>,
    ) -> Result<()> {
        if uris.len() > MAX_ITEMS_PER_ADD {
            bail!("too many uris in one call: {}", uris.len());
        }
        self.added.lock().unwrap().push(AddCall {
            playlist_id: playlist_id.to_string(),
            uris: uris.to_vec(),
            position,
        });
        Ok(())
    }

    async fn delete_playlist(&self, playlist_id: &str) -> Result<()> {
        self.playlists
            .lock()
            .unwrap()
            .retain(|playlist| playlist.id != playlist_id);
        self.deleted.lock().unwrap().push(playlist_id.to_string());
        Ok(())
    }
}
