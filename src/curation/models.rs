//! Request and result records for playlist generation.

use serde::{Deserialize, Serialize};

fn default_num_songs() -> usize {
    20
}

fn default_allow_explicit() -> bool {
    true
}

/// A single playlist-generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Explicit target name. When absent the name is derived from the
    /// guidelines (or from the weekday in daily-drive mode).
    #[serde(default)]
    pub name: Option<String>,

    /// Free-text guidelines driving ruleset matching.
    #[serde(default)]
    pub guidelines: String,

    #[serde(default = "default_num_songs")]
    pub num_songs: usize,

    #[serde(default)]
    pub is_daily_drive: bool,

    #[serde(default = "default_allow_explicit")]
    pub allow_explicit: bool,

    /// Apply this ruleset by name instead of keyword matching.
    #[serde(default)]
    pub ruleset_name: Option<String>,

    /// Drop episode items from source playlists.
    #[serde(default)]
    pub music_only: bool,

    /// Local-time offset for weekday and year resolution. Falls back to the
    /// clock's own offset when absent.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            name: None,
            guidelines: String::new(),
            num_songs: default_num_songs(),
            is_daily_drive: false,
            allow_explicit: default_allow_explicit(),
            ruleset_name: None,
            music_only: false,
            utc_offset_minutes: None,
        }
    }
}

/// Result of a successful generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistCreated {
    pub playlist_id: String,
    pub name: String,
    pub url: String,
    pub rulesets_applied: Vec<String>,
    pub items_count: usize,
}
