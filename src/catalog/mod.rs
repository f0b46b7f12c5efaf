mod client;
mod models;
mod spotify;

pub use client::{CatalogClient, MAX_ITEMS_PER_ADD};
pub use models::{
    Artist, ArtistDetail, ArtistRef, CatalogItem, CreatedPlaylist, ItemKind, PlaylistSummary,
    Show,
};
pub use spotify::{SpotifyClient, DEFAULT_API_BASE_URL};
