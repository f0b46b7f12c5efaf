//! HTTP implementation of [`CatalogClient`] for a Spotify-compatible Web API.

use super::client::{CatalogClient, MAX_ITEMS_PER_ADD};
use super::models::{
    Artist, ArtistDetail, ArtistRef, CatalogItem, CreatedPlaylist, ItemKind, PlaylistSummary,
    Show,
};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Page size for the user-library endpoints.
const PAGE_LIMIT: usize = 50;
/// Page size for playlist item fetches (the API allows up to 100 there).
const PLAYLIST_PAGE_LIMIT: usize = 100;

pub struct SpotifyClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl SpotifyClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `base_url` - API base URL (e.g. "https://api.spotify.com/v1")
    /// * `access_token` - Bearer token; acquiring it is the caller's concern
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: String, access_token: String, timeout_sec: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .expect("Failed to create HTTP client");

        let base_url = base_url.trim_end_matches('/').to_string();

        Self {
            client,
            base_url,
            access_token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", what))?;

        if !response.status().is_success() {
            bail!("Failed to fetch {}: status {}", what, response.status());
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }

    /// Resolve the authenticated user's profile id.
    async fn get_profile_id(&self) -> Result<String> {
        let url = format!("{}/me", self.base_url);
        let profile: ProfileResponse = self.get_json(&url, "user profile").await?;
        Ok(profile.id)
    }
}

#[async_trait]
impl CatalogClient for SpotifyClient {
    async fn get_top_artists(&self, limit: usize) -> Result<Vec<Artist>> {
        let url = format!(
            "{}/me/top/artists?limit={}&time_range=long_term",
            self.base_url, limit
        );
        let page: ItemsPage<ArtistObject> = self.get_json(&url, "top artists").await?;
        Ok(page.items.into_iter().map(map_artist).collect())
    }

    async fn get_followed_artists(&self) -> Result<Vec<Artist>> {
        let mut artists = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let url = match &after {
                Some(cursor) => format!(
                    "{}/me/following?type=artist&limit={}&after={}",
                    self.base_url, PAGE_LIMIT, cursor
                ),
                None => format!(
                    "{}/me/following?type=artist&limit={}",
                    self.base_url, PAGE_LIMIT
                ),
            };
            let page: FollowingResponse = self.get_json(&url, "followed artists").await?;
            let batch = page.artists.items;
            if batch.is_empty() {
                break;
            }
            artists.extend(batch.into_iter().map(map_artist));
            after = page.artists.cursors.and_then(|c| c.after);
            if after.is_none() {
                break;
            }
        }

        Ok(artists)
    }

    async fn get_artist(&self, artist_id: &str) -> Result<ArtistDetail> {
        let url = format!("{}/artists/{}", self.base_url, artist_id);
        let artist: ArtistObject = self
            .get_json(&url, &format!("artist {}", artist_id))
            .await?;
        Ok(ArtistDetail {
            followers: artist.followers.map(|f| f.total).unwrap_or(0),
            id: artist.id,
            name: artist.name,
            genres: artist.genres,
        })
    }

    async fn get_artist_top_tracks(&self, artist_id: &str) -> Result<Vec<CatalogItem>> {
        let url = format!(
            "{}/artists/{}/top-tracks?market=from_token",
            self.base_url, artist_id
        );
        let response: TopTracksResponse = self
            .get_json(&url, &format!("top tracks for artist {}", artist_id))
            .await?;
        Ok(response.tracks.into_iter().map(map_track).collect())
    }

    async fn get_saved_tracks(&self, limit: usize) -> Result<Vec<CatalogItem>> {
        let mut tracks = Vec::new();
        let mut offset = 0;

        while tracks.len() < limit {
            let page_size = PAGE_LIMIT.min(limit - tracks.len());
            let url = format!(
                "{}/me/tracks?limit={}&offset={}",
                self.base_url, page_size, offset
            );
            let page: ItemsPage<SavedTrackObject> = self.get_json(&url, "saved tracks").await?;
            let count = page.items.len();
            if count == 0 {
                break;
            }
            tracks.extend(page.items.into_iter().map(|s| map_track(s.track)));
            if count < page_size {
                break;
            }
            offset += count;
        }

        tracks.truncate(limit);
        Ok(tracks)
    }

    async fn get_saved_shows(&self) -> Result<Vec<Show>> {
        let mut shows = Vec::new();
        let mut offset = 0;

        loop {
            let url = format!(
                "{}/me/shows?limit={}&offset={}",
                self.base_url, PAGE_LIMIT, offset
            );
            let page: ItemsPage<SavedShowObject> = self.get_json(&url, "saved shows").await?;
            let count = page.items.len();
            if count == 0 {
                break;
            }
            shows.extend(page.items.into_iter().map(|s| Show {
                id: s.show.id,
                name: s.show.name,
                publisher: s.show.publisher,
                description: s.show.description,
            }));
            if count < PAGE_LIMIT {
                break;
            }
            offset += count;
        }

        Ok(shows)
    }

    async fn search_tracks(&self, query: &str, limit: usize) -> Result<Vec<CatalogItem>> {
        let url = format!(
            "{}/search?q={}&type=track&limit={}",
            self.base_url,
            urlencoding::encode(query),
            limit
        );
        let response: TrackSearchResponse = self.get_json(&url, "track search").await?;
        Ok(response.tracks.items.into_iter().map(map_track).collect())
    }

    async fn search_episodes(&self, query: &str, limit: usize) -> Result<Vec<CatalogItem>> {
        let url = format!(
            "{}/search?q={}&type=episode&limit={}",
            self.base_url,
            urlencoding::encode(query),
            limit
        );
        let response: EpisodeSearchResponse = self.get_json(&url, "episode search").await?;
        Ok(response.episodes.items.into_iter().map(map_episode).collect())
    }

    async fn get_track(&self, track_id: &str) -> Result<CatalogItem> {
        let url = format!("{}/tracks/{}", self.base_url, track_id);
        let track: TrackObject = self.get_json(&url, &format!("track {}", track_id)).await?;
        Ok(map_track(track))
    }

    async fn get_episode(&self, episode_id: &str) -> Result<CatalogItem> {
        let url = format!("{}/episodes/{}", self.base_url, episode_id);
        let episode: EpisodeObject = self
            .get_json(&url, &format!("episode {}", episode_id))
            .await?;
        Ok(map_episode(episode))
    }

    async fn get_user_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let mut playlists = Vec::new();
        let mut offset = 0;

        loop {
            let url = format!(
                "{}/me/playlists?limit={}&offset={}",
                self.base_url, PAGE_LIMIT, offset
            );
            let page: ItemsPage<PlaylistObject> = self.get_json(&url, "user playlists").await?;
            let count = page.items.len();
            if count == 0 {
                break;
            }
            playlists.extend(page.items.into_iter().map(|p| PlaylistSummary {
                id: p.id,
                name: p.name,
                owner: p
                    .owner
                    .map(|o| o.display_name.unwrap_or(o.id))
                    .unwrap_or_default(),
                tracks_total: p.tracks.map(|t| t.total).unwrap_or(0),
            }));
            if count < PAGE_LIMIT {
                break;
            }
            offset += count;
        }

        Ok(playlists)
    }

    async fn get_playlist_items(&self, playlist_id: &str) -> Result<Vec<CatalogItem>> {
        let mut items = Vec::new();
        let mut offset = 0;

        loop {
            let url = format!(
                "{}/playlists/{}/tracks?limit={}&offset={}",
                self.base_url, playlist_id, PLAYLIST_PAGE_LIMIT, offset
            );
            let page: ItemsPage<PlaylistItemObject> = self
                .get_json(&url, &format!("items of playlist {}", playlist_id))
                .await?;
            let count = page.items.len();
            if count == 0 {
                break;
            }
            items.extend(
                page.items
                    .into_iter()
                    .filter_map(|entry| entry.track)
                    .filter_map(map_playable),
            );
            if count < PLAYLIST_PAGE_LIMIT {
                break;
            }
            offset += count;
        }

        Ok(items)
    }

    async fn create_playlist(
        &self,
        name: &str,
        description: &str,
        public: bool,
    ) -> Result<CreatedPlaylist> {
        let profile_id = self.get_profile_id().await?;
        let url = format!("{}/users/{}/playlists", self.base_url, profile_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&serde_json::json!({
                "name": name,
                "description": description,
                "public": public,
            }))
            .send()
            .await
            .context("Failed to create playlist")?;

        if !response.status().is_success() {
            bail!("Failed to create playlist: status {}", response.status());
        }

        let created: CreatedPlaylistResponse = response
            .json()
            .await
            .context("Failed to parse create playlist response")?;

        let url = created
            .external_urls
            .and_then(|u| u.spotify)
            .unwrap_or_else(|| format!("https://open.spotify.com/playlist/{}", created.id));

        Ok(CreatedPlaylist {
            id: created.id,
            url,
        })
    }

    async fn add_items(
        &self,
        playlist_id: &str,
        uris: &[String],
        position: Option<usize>,
    ) -> Result<()> {
        if uris.len() > MAX_ITEMS_PER_ADD {
            bail!(
                "Cannot add {} items in one call (max {})",
                uris.len(),
                MAX_ITEMS_PER_ADD
            );
        }

        let url = format!("{}/playlists/{}/tracks", self.base_url, playlist_id);
        let mut payload = serde_json::json!({ "uris": uris });
        if let Some(position) = position {
            payload["position"] = serde_json::json!(position);
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("Failed to add items to playlist {}", playlist_id))?;

        if !response.status().is_success() {
            bail!(
                "Failed to add items to playlist {}: status {}",
                playlist_id,
                response.status()
            );
        }

        Ok(())
    }

    async fn delete_playlist(&self, playlist_id: &str) -> Result<()> {
        // Playlists are never destroyed on the service side; unfollowing
        // removes them from the user's library.
        let url = format!("{}/playlists/{}/followers", self.base_url, playlist_id);
        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .with_context(|| format!("Failed to delete playlist {}", playlist_id))?;

        if !response.status().is_success() {
            bail!(
                "Failed to delete playlist {}: status {}",
                playlist_id,
                response.status()
            );
        }

        Ok(())
    }
}

// Wire-format payloads. Kept private; everything public goes through the
// domain models.

#[derive(Deserialize)]
struct ProfileResponse {
    id: String,
}

#[derive(Deserialize)]
struct ItemsPage<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
struct FollowingResponse {
    artists: CursorPage,
}

#[derive(Deserialize)]
struct CursorPage {
    #[serde(default)]
    items: Vec<ArtistObject>,
    #[serde(default)]
    cursors: Option<Cursors>,
}

#[derive(Deserialize)]
struct Cursors {
    #[serde(default)]
    after: Option<String>,
}

#[derive(Deserialize)]
struct ArtistObject {
    id: String,
    name: String,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    followers: Option<FollowersObject>,
}

#[derive(Deserialize)]
struct FollowersObject {
    total: u64,
}

#[derive(Deserialize)]
struct SimpleArtistObject {
    name: String,
    #[serde(default)]
    genres: Vec<String>,
}

#[derive(Deserialize)]
struct AlbumObject {
    #[serde(default)]
    release_date: Option<String>,
}

#[derive(Deserialize)]
struct TrackObject {
    id: String,
    name: String,
    #[serde(default)]
    explicit: bool,
    #[serde(default)]
    artists: Vec<SimpleArtistObject>,
    #[serde(default)]
    album: Option<AlbumObject>,
}

#[derive(Deserialize)]
struct TopTracksResponse {
    #[serde(default)]
    tracks: Vec<TrackObject>,
}

#[derive(Deserialize)]
struct SavedTrackObject {
    track: TrackObject,
}

#[derive(Deserialize)]
struct SavedShowObject {
    show: ShowObject,
}

#[derive(Deserialize)]
struct ShowObject {
    id: String,
    name: String,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct ShowNameObject {
    name: String,
}

#[derive(Deserialize)]
struct EpisodeObject {
    id: String,
    name: String,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    explicit: bool,
    #[serde(default)]
    show: Option<ShowNameObject>,
}

#[derive(Deserialize)]
struct TrackSearchResponse {
    tracks: ItemsPage<TrackObject>,
}

#[derive(Deserialize)]
struct EpisodeSearchResponse {
    episodes: ItemsPage<EpisodeObject>,
}

#[derive(Deserialize)]
struct PlaylistObject {
    id: String,
    name: String,
    #[serde(default)]
    owner: Option<OwnerObject>,
    #[serde(default)]
    tracks: Option<TracksRefObject>,
}

#[derive(Deserialize)]
struct OwnerObject {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct TracksRefObject {
    #[serde(default)]
    total: usize,
}

#[derive(Deserialize)]
struct PlaylistItemObject {
    // Null for removed/unavailable entries.
    #[serde(default)]
    track: Option<PlayableObject>,
}

/// Superset of track and episode fields; playlists can hold both.
#[derive(Deserialize)]
struct PlayableObject {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(rename = "type", default)]
    item_type: Option<String>,
    #[serde(default)]
    explicit: bool,
    #[serde(default)]
    artists: Vec<SimpleArtistObject>,
    #[serde(default)]
    album: Option<AlbumObject>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    show: Option<ShowNameObject>,
}

#[derive(Deserialize)]
struct CreatedPlaylistResponse {
    id: String,
    #[serde(default)]
    external_urls: Option<ExternalUrls>,
}

#[derive(Deserialize)]
struct ExternalUrls {
    #[serde(default)]
    spotify: Option<String>,
}

fn map_artist(artist: ArtistObject) -> Artist {
    Artist {
        id: artist.id,
        name: artist.name,
        genres: artist.genres,
    }
}

fn map_track(track: TrackObject) -> CatalogItem {
    CatalogItem {
        id: track.id,
        kind: ItemKind::Track,
        name: track.name,
        artists: track
            .artists
            .into_iter()
            .map(|a| ArtistRef {
                name: a.name,
                genres: a.genres,
            })
            .collect(),
        release_date: track.album.and_then(|a| a.release_date),
        explicit: track.explicit,
        show_name: None,
    }
}

fn map_episode(episode: EpisodeObject) -> CatalogItem {
    CatalogItem {
        id: episode.id,
        kind: ItemKind::Episode,
        name: episode.name,
        artists: vec![],
        release_date: episode.release_date,
        explicit: episode.explicit,
        show_name: episode.show.map(|s| s.name),
    }
}

/// Map a playlist entry; local items without an id are dropped.
fn map_playable(playable: PlayableObject) -> Option<CatalogItem> {
    let id = playable.id?;
    let kind = match playable.item_type.as_deref() {
        Some("episode") => ItemKind::Episode,
        _ => ItemKind::Track,
    };
    let release_date = match kind {
        ItemKind::Track => playable.album.and_then(|a| a.release_date),
        ItemKind::Episode => playable.release_date,
    };
    Some(CatalogItem {
        id,
        kind,
        name: playable.name,
        artists: playable
            .artists
            .into_iter()
            .map(|a| ArtistRef {
                name: a.name,
                genres: a.genres,
            })
            .collect(),
        release_date,
        explicit: playable.explicit,
        show_name: playable.show.map(|s| s.name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SpotifyClient::new(
            "https://api.spotify.com/v1".to_string(),
            "token".to_string(),
            30,
        );
        assert_eq!(client.base_url(), "https://api.spotify.com/v1");
    }

    #[test]
    fn test_trailing_slash_removal() {
        let client = SpotifyClient::new(
            "https://api.spotify.com/v1/".to_string(),
            "token".to_string(),
            30,
        );
        assert_eq!(client.base_url(), "https://api.spotify.com/v1");
    }

    #[test]
    fn test_map_track_takes_release_date_from_album() {
        let track: TrackObject = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "name": "Song",
            "explicit": true,
            "artists": [{"name": "Band", "genres": ["rock"]}],
            "album": {"release_date": "2008-06-17"}
        }))
        .unwrap();

        let item = map_track(track);
        assert_eq!(item.id, "t1");
        assert_eq!(item.kind, ItemKind::Track);
        assert!(item.explicit);
        assert_eq!(item.release_date.as_deref(), Some("2008-06-17"));
        assert_eq!(item.artists[0].name, "Band");
        assert_eq!(item.uri(), "spotify:track:t1");
    }

    #[test]
    fn test_map_episode_carries_show_name() {
        let episode: EpisodeObject = serde_json::from_value(serde_json::json!({
            "id": "e1",
            "name": "Monday Briefing",
            "release_date": "2024-01-15",
            "show": {"name": "The Daily"}
        }))
        .unwrap();

        let item = map_episode(episode);
        assert_eq!(item.kind, ItemKind::Episode);
        assert_eq!(item.show_name.as_deref(), Some("The Daily"));
        assert_eq!(item.uri(), "spotify:episode:e1");
    }

    #[test]
    fn test_map_playable_distinguishes_kinds() {
        let track: PlayableObject = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "name": "Song",
            "type": "track",
            "album": {"release_date": "1999"}
        }))
        .unwrap();
        let episode: PlayableObject = serde_json::from_value(serde_json::json!({
            "id": "e1",
            "name": "Ep",
            "type": "episode",
            "release_date": "2024-01-01"
        }))
        .unwrap();

        let track = map_playable(track).unwrap();
        let episode = map_playable(episode).unwrap();
        assert_eq!(track.kind, ItemKind::Track);
        assert_eq!(track.release_date.as_deref(), Some("1999"));
        assert_eq!(episode.kind, ItemKind::Episode);
        assert_eq!(episode.release_date.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn test_map_playable_drops_local_items() {
        let local: PlayableObject = serde_json::from_value(serde_json::json!({
            "id": null,
            "name": "Local File",
            "type": "track"
        }))
        .unwrap();
        assert!(map_playable(local).is_none());
    }

    #[test]
    fn test_followed_artists_page_parses() {
        let page: FollowingResponse = serde_json::from_value(serde_json::json!({
            "artists": {
                "items": [
                    {"id": "a1", "name": "First", "genres": ["rock"]},
                    {"id": "a2", "name": "Second"}
                ],
                "cursors": {"after": "a2"}
            }
        }))
        .unwrap();

        assert_eq!(page.artists.items.len(), 2);
        assert_eq!(page.artists.cursors.unwrap().after.as_deref(), Some("a2"));
    }

    #[test]
    fn test_artist_detail_defaults_missing_followers_to_zero() {
        let artist: ArtistObject = serde_json::from_value(serde_json::json!({
            "id": "a1",
            "name": "Sparse"
        }))
        .unwrap();
        assert!(artist.followers.is_none());

        let with_count: ArtistObject = serde_json::from_value(serde_json::json!({
            "id": "a2",
            "name": "Big",
            "followers": {"total": 8000001}
        }))
        .unwrap();
        assert_eq!(with_count.followers.unwrap().total, 8000001);
    }
}
