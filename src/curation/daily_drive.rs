//! Daily-drive naming, intro injection, and regeneration policy.

use super::error::GenerationError;
use crate::catalog::CatalogClient;
use crate::playlist_store::PlaylistRecordStore;
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use tracing::info;

pub const DAILY_DRIVE_PREFIX: &str = "Daily Drive";

/// English weekday name for the given local time.
pub fn weekday_name(now: DateTime<FixedOffset>) -> String {
    now.format("%A").to_string()
}

/// Naming and intro policy for the recurring daily-drive playlist.
pub struct DailyDrivePolicy {
    /// Weekday name (lowercase) to intro item URI.
    intros: HashMap<String, String>,
}

impl DailyDrivePolicy {
    pub fn new(intros: HashMap<String, String>) -> Self {
        Self { intros }
    }

    /// Target playlist name; a pure function of the local weekday, so it is
    /// unique per calendar day rather than per run.
    pub fn playlist_name(&self, now: DateTime<FixedOffset>) -> String {
        format!("{} - {}", DAILY_DRIVE_PREFIX, weekday_name(now))
    }

    /// Intro URI configured for the weekday. A missing mapping is a no-op
    /// for the caller, not an error.
    pub fn intro_uri(&self, now: DateTime<FixedOffset>) -> Option<String> {
        self.intros.get(&weekday_name(now).to_lowercase()).cloned()
    }

    /// Delete every existing playlist whose name matches exactly, both at
    /// the catalog service and in local records.
    ///
    /// Returns the number of playlists deleted. Running this before creating
    /// makes regeneration idempotent per day.
    pub async fn purge_existing(
        &self,
        client: &dyn CatalogClient,
        records: &dyn PlaylistRecordStore,
        name: &str,
    ) -> Result<usize, GenerationError> {
        let playlists = client
            .get_user_playlists()
            .await
            .map_err(GenerationError::Catalog)?;

        let mut deleted = 0;
        for playlist in playlists {
            if playlist.name != name {
                continue;
            }
            client
                .delete_playlist(&playlist.id)
                .await
                .map_err(GenerationError::Catalog)?;
            records
                .delete_by_playlist_id(&playlist.id)
                .map_err(GenerationError::Store)?;
            deleted += 1;
        }

        if deleted > 0 {
            info!(name, deleted, "Purged previous daily drive playlists");
        }
        Ok(deleted)
    }
}

/// Ordinary-mode guard: fail when any existing playlist name matches exactly.
pub async fn ensure_name_available(
    client: &dyn CatalogClient,
    name: &str,
) -> Result<(), GenerationError> {
    let playlists = client
        .get_user_playlists()
        .await
        .map_err(GenerationError::Catalog)?;

    if playlists.iter().any(|p| p.name == name) {
        return Err(GenerationError::NameConflict(name.to_string()));
    }
    Ok(())
}
