//! Domain models for catalog content.

use serde::{Deserialize, Serialize};

/// Kind of playable catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Track,
    Episode,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Track => "track",
            ItemKind::Episode => "episode",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "track" => Some(ItemKind::Track),
            "episode" => Some(ItemKind::Episode),
            _ => None,
        }
    }
}

/// Artist as referenced by a catalog item.
///
/// Genres are only populated when the backing service includes them on the
/// item payload; an empty list means "unknown", not "genreless".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// A playable item (track or podcast episode).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub kind: ItemKind,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    /// Release date as `YYYY` or `YYYY-MM-DD`; absent when the service
    /// doesn't report one.
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub explicit: bool,
    /// Owning show name (episodes only).
    #[serde(default)]
    pub show_name: Option<String>,
}

impl CatalogItem {
    /// Playable URI, e.g. `spotify:track:abc123`.
    pub fn uri(&self) -> String {
        format!("spotify:{}:{}", self.kind.as_str(), self.id)
    }

    /// Release year parsed from the first four characters of the release
    /// date. Returns None when the date is absent or unparseable.
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse::<i32>().ok())
    }

    /// Union of genres across the item's artists, in encounter order.
    pub fn genres(&self) -> Vec<&str> {
        self.artists
            .iter()
            .flat_map(|a| a.genres.iter().map(String::as_str))
            .collect()
    }
}

/// Artist as returned by followed/top listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Full artist record, fetched per-artist for follower counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistDetail {
    pub id: String,
    pub name: String,
    pub followers: u64,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// A saved podcast/show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Playlist as listed for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub tracks_total: usize,
}

/// Result of creating a playlist on the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedPlaylist {
    pub id: String,
    /// Externally resolvable URL for the playlist.
    pub url: String,
}
