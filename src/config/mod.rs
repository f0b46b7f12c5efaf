mod file_config;

pub use file_config::{DailyDriveConfig, FileConfig};

use crate::catalog::DEFAULT_API_BASE_URL;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub api_base_url: Option<String>,
    pub access_token: Option<String>,
    pub access_token_file: Option<PathBuf>,
    pub http_timeout_sec: u64,
    pub default_song_count: usize,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub db_dir: PathBuf,
    pub api_base_url: String,
    /// Only required by commands that talk to the catalog service.
    pub access_token: Option<String>,
    pub http_timeout_sec: u64,
    pub default_song_count: usize,
    pub user_id: String,

    /// Daily-drive intro URIs, keyed by lowercase weekday name.
    pub daily_drive_intros: HashMap<String, String>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let access_token = resolve_access_token(cli, &file)?;

        // TOML overrides CLI for each field
        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        // Validate db_dir exists
        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let api_base_url = file
            .api_base_url
            .or_else(|| cli.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let http_timeout_sec = file.http_timeout_sec.unwrap_or(cli.http_timeout_sec);
        let default_song_count = file.default_song_count.unwrap_or(cli.default_song_count);

        let user_id = file
            .user_id
            .or_else(|| cli.user_id.clone())
            .unwrap_or_else(|| "local".to_string());

        let daily_drive_intros = file
            .daily_drive
            .and_then(|d| d.intros)
            .unwrap_or_default()
            .into_iter()
            .map(|(day, uri)| (day.to_lowercase(), uri))
            .collect();

        Ok(Self {
            db_dir,
            api_base_url,
            access_token,
            http_timeout_sec,
            default_song_count,
            user_id,
            daily_drive_intros,
        })
    }

    /// Fails with a hint when the resolved config carries no access token.
    pub fn require_access_token(&self) -> Result<&str> {
        self.access_token.as_deref().ok_or_else(|| {
            anyhow::anyhow!(
                "Access token must be provided via --access-token, CATALOG_ACCESS_TOKEN, \
                 or an access_token entry in the config file"
            )
        })
    }

    pub fn rulesets_db_path(&self) -> PathBuf {
        self.db_dir.join("rulesets.db")
    }

    pub fn playlists_db_path(&self) -> PathBuf {
        self.db_dir.join("playlists.db")
    }
}

/// A token file (TOML over CLI) wins over an inline token value.
fn resolve_access_token(cli: &CliConfig, file: &FileConfig) -> Result<Option<String>> {
    let token_file = file
        .access_token_file
        .clone()
        .map(PathBuf::from)
        .or_else(|| cli.access_token_file.clone());

    if let Some(path) = token_file {
        let token = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read access token file: {:?}", path))?
            .trim()
            .to_string();
        if token.is_empty() {
            bail!("Access token file is empty: {:?}", path);
        }
        return Ok(Some(token));
    }

    let token = file
        .access_token
        .clone()
        .or_else(|| cli.access_token.clone())
        .unwrap_or_default()
        .trim()
        .to_string();
    if token.is_empty() {
        return Ok(None);
    }
    Ok(Some(token))
}
