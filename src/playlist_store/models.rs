//! Records of playlists this tool has created.

use serde::{Deserialize, Serialize};

/// A locally recorded playlist creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistRecord {
    pub id: i64,
    /// Playlist id at the catalog service. Unique per record.
    pub playlist_id: String,
    pub name: String,
    pub guidelines: Option<String>,
    pub rulesets_applied: Vec<String>,
    /// Generation run that produced the playlist.
    pub run_id: Option<String>,
    pub created_at: i64,
}

/// Fields for recording a newly created playlist.
#[derive(Debug, Clone)]
pub struct NewPlaylistRecord {
    pub playlist_id: String,
    pub name: String,
    pub guidelines: Option<String>,
    pub rulesets_applied: Vec<String>,
    pub run_id: Option<String>,
}
