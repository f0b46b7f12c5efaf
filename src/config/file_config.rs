use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_dir: Option<String>,
    pub api_base_url: Option<String>,
    pub access_token: Option<String>,
    pub access_token_file: Option<String>,
    pub http_timeout_sec: Option<u64>,
    pub default_song_count: Option<usize>,
    pub user_id: Option<String>,

    // Feature configs
    pub daily_drive: Option<DailyDriveConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct DailyDriveConfig {
    /// Weekday name to intro item URI.
    pub intros: Option<HashMap<String, String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
