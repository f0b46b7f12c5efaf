//! Playlist generation orchestration.

use super::daily_drive::{ensure_name_available, DailyDrivePolicy};
use super::error::GenerationError;
use super::filter::{dedupe_by_uri, filter_items};
use super::models::{GenerationRequest, PlaylistCreated};
use super::sampler::{sample_tracks, ArtistPool};
use super::tiers::{quota_for, ArtistTier};
use crate::catalog::{CatalogClient, CatalogItem, ItemKind, MAX_ITEMS_PER_ADD};
use crate::clock::Clock;
use crate::playlist_store::{NewPlaylistRecord, PlaylistRecordStore};
use crate::ruleset::{match_rulesets, Ruleset, RulesetStore, SourceMode};
use chrono::{Datelike, FixedOffset};
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Fallback artist count when the user follows nobody.
const TOP_ARTIST_LIMIT: usize = 50;

/// Runs the full curation pipeline against the catalog service.
pub struct PlaylistGenerator {
    client: Arc<dyn CatalogClient>,
    rulesets: Arc<dyn RulesetStore>,
    records: Arc<dyn PlaylistRecordStore>,
    clock: Arc<dyn Clock>,
    daily_drive: DailyDrivePolicy,
}

impl PlaylistGenerator {
    pub fn new(
        client: Arc<dyn CatalogClient>,
        rulesets: Arc<dyn RulesetStore>,
        records: Arc<dyn PlaylistRecordStore>,
        clock: Arc<dyn Clock>,
        daily_drive: DailyDrivePolicy,
    ) -> Self {
        Self {
            client,
            rulesets,
            records,
            clock,
            daily_drive,
        }
    }

    /// Generate and create one playlist.
    ///
    /// The randomness source is injected so runs can be replayed in tests.
    pub async fn generate<R: Rng + Send>(
        &self,
        request: GenerationRequest,
        rng: &mut R,
    ) -> Result<PlaylistCreated, GenerationError> {
        let run_id = Uuid::new_v4();
        info!(
            run_id = %run_id,
            daily_drive = request.is_daily_drive,
            num_songs = request.num_songs,
            "Starting playlist generation"
        );

        let mut now = self.clock.now();
        if let Some(minutes) = request.utc_offset_minutes {
            match FixedOffset::east_opt(minutes * 60) {
                Some(offset) => now = now.with_timezone(&offset),
                None => warn!(minutes, "Ignoring invalid UTC offset"),
            }
        }
        let current_year = now.year();

        let applied = resolve_applied_rulesets(self.rulesets.as_ref(), &request)?;
        let applied_names: Vec<String> = applied.iter().map(|r| r.name.clone()).collect();
        if !applied_names.is_empty() {
            info!(rulesets = ?applied_names, "Applying rulesets");
        }

        let name = if request.is_daily_drive {
            self.daily_drive.playlist_name(now)
        } else {
            ordinary_target_name(&request, &applied)?
        };

        if request.is_daily_drive {
            self.daily_drive
                .purge_existing(self.client.as_ref(), self.records.as_ref(), &name)
                .await?;
        } else {
            ensure_name_available(self.client.as_ref(), &name).await?;
        }

        let (source_items, source_mode) = self
            .collect_source_items(&applied, request.music_only, current_year)
            .await?;

        let mut items = if source_mode == Some(SourceMode::Replace) && !source_items.is_empty() {
            info!(
                count = source_items.len(),
                "Using source playlists in replace mode; skipping sampling"
            );
            source_items
        } else {
            let mut sampled = self
                .sample_candidates(&request, &applied, current_year, rng)
                .await?;
            if source_mode == Some(SourceMode::Supplement) {
                sampled.extend(source_items);
            }
            sampled
        };

        items = dedupe_by_uri(items);
        items.truncate(request.num_songs);

        if items.is_empty() {
            return Err(GenerationError::EmptyResult);
        }

        let description = playlist_description(&applied, &request.guidelines);
        let created = self
            .client
            .create_playlist(&name, &description, false)
            .await
            .map_err(GenerationError::Catalog)?;

        let mut uris: Vec<String> = items.iter().map(|item| item.uri()).collect();
        if request.is_daily_drive {
            if let Some(intro) = self.daily_drive.intro_uri(now) {
                uris.insert(0, intro);
            }
        }

        for chunk in uris.chunks(MAX_ITEMS_PER_ADD) {
            debug!(playlist_id = %created.id, count = chunk.len(), "Adding items");
            self.client
                .add_items(&created.id, chunk, None)
                .await
                .map_err(GenerationError::Catalog)?;
        }

        self.records
            .insert(NewPlaylistRecord {
                playlist_id: created.id.clone(),
                name: name.clone(),
                guidelines: Some(request.guidelines.trim().to_string())
                    .filter(|g| !g.is_empty()),
                rulesets_applied: applied_names.clone(),
                run_id: Some(run_id.to_string()),
            })
            .map_err(GenerationError::Store)?;

        info!(
            run_id = %run_id,
            playlist_id = %created.id,
            name = %name,
            items = uris.len(),
            "Playlist created"
        );

        Ok(PlaylistCreated {
            playlist_id: created.id,
            name,
            url: created.url,
            rulesets_applied: applied_names,
            items_count: uris.len(),
        })
    }

    /// Resolve source-playlist material named by the applied rulesets.
    ///
    /// Returns the filtered items and the source mode of the first
    /// source-bearing ruleset. A named playlist that does not exist fails the
    /// run regardless of mode.
    async fn collect_source_items(
        &self,
        applied: &[Ruleset],
        music_only: bool,
        current_year: i32,
    ) -> Result<(Vec<CatalogItem>, Option<SourceMode>), GenerationError> {
        let source_rulesets: Vec<&Ruleset> = applied
            .iter()
            .filter(|r| !r.source_playlist_names.is_empty())
            .collect();
        if source_rulesets.is_empty() {
            return Ok((vec![], None));
        }

        let playlists = self
            .client
            .get_user_playlists()
            .await
            .map_err(GenerationError::Catalog)?;

        let mut items = Vec::new();
        for ruleset in &source_rulesets {
            for source_name in &ruleset.source_playlist_names {
                let playlist = playlists
                    .iter()
                    .find(|p| p.name.to_lowercase() == source_name.to_lowercase())
                    .ok_or_else(|| {
                        GenerationError::SourcePlaylistNotFound(source_name.clone())
                    })?;
                let playlist_items = self
                    .client
                    .get_playlist_items(&playlist.id)
                    .await
                    .map_err(GenerationError::Catalog)?;
                debug!(
                    source = %source_name,
                    count = playlist_items.len(),
                    "Fetched source playlist"
                );
                items.extend(playlist_items);
            }
        }

        let mut items = dedupe_by_uri(items);
        if music_only {
            items.retain(|item| item.kind == ItemKind::Track);
        }
        for ruleset in applied {
            items = filter_items(items, Some(ruleset), current_year);
        }

        Ok((items, Some(source_rulesets[0].source_mode)))
    }

    /// Sample tracks from followed (or top) artists under tier quotas, then
    /// fetch full records and filter them.
    ///
    /// Per-artist fetch failures shrink the candidate set instead of failing
    /// the run.
    async fn sample_candidates<R: Rng + Send>(
        &self,
        request: &GenerationRequest,
        applied: &[Ruleset],
        current_year: i32,
        rng: &mut R,
    ) -> Result<Vec<CatalogItem>, GenerationError> {
        let mut artists = self
            .client
            .get_followed_artists()
            .await
            .map_err(GenerationError::Catalog)?;
        if artists.is_empty() {
            artists = self
                .client
                .get_top_artists(TOP_ARTIST_LIMIT)
                .await
                .map_err(GenerationError::Catalog)?;
        }

        let mut pools = Vec::with_capacity(artists.len());
        for artist in artists {
            let followers = match self.client.get_artist(&artist.id).await {
                Ok(detail) => detail.followers,
                Err(e) => {
                    warn!(artist = %artist.name, error = %e, "Failed to fetch artist detail, assuming lowest tier");
                    0
                }
            };
            let quota = quota_for(followers, request.num_songs);
            let tracks = match self.client.get_artist_top_tracks(&artist.id).await {
                Ok(tracks) => tracks,
                Err(e) => {
                    warn!(artist = %artist.name, error = %e, "Failed to fetch artist tracks, skipping");
                    vec![]
                }
            };
            debug!(
                artist = %artist.name,
                followers,
                tier = ArtistTier::classify(followers).as_str(),
                quota,
                pool = tracks.len(),
                "Classified artist"
            );
            pools.push(ArtistPool {
                artist,
                quota,
                tracks,
            });
        }

        let sampled_ids = sample_tracks(pools, request.num_songs, request.allow_explicit, rng);

        let mut items = Vec::with_capacity(sampled_ids.len());
        for track_id in &sampled_ids {
            match self.client.get_track(track_id).await {
                Ok(item) => items.push(item),
                Err(e) => {
                    warn!(track_id = %track_id, error = %e, "Failed to fetch sampled track, dropping");
                }
            }
        }

        for ruleset in applied {
            items = filter_items(items, Some(ruleset), current_year);
        }

        Ok(items)
    }
}

/// Pick the rulesets for a request: an explicitly named ruleset wins over
/// keyword matching against the guidelines.
fn resolve_applied_rulesets(
    store: &dyn RulesetStore,
    request: &GenerationRequest,
) -> Result<Vec<Ruleset>, GenerationError> {
    if let Some(name) = &request.ruleset_name {
        let ruleset = store
            .get_by_name(name)
            .map_err(GenerationError::Store)?
            .ok_or_else(|| GenerationError::RulesetNotFound(name.clone()))?;
        return Ok(vec![ruleset]);
    }

    if request.guidelines.trim().is_empty() {
        return Ok(vec![]);
    }

    let all = store.list().map_err(GenerationError::Store)?;
    Ok(match_rulesets(&request.guidelines, &all).matched)
}

/// Target name for an ordinary (non daily-drive) request.
fn ordinary_target_name(
    request: &GenerationRequest,
    applied: &[Ruleset],
) -> Result<String, GenerationError> {
    if let Some(name) = &request.name {
        let trimmed = name.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }

    let guidelines = request.guidelines.trim();
    if guidelines.is_empty() {
        return Err(GenerationError::InvalidRequest(
            "a playlist name or guidelines are required".to_string(),
        ));
    }

    if applied.is_empty() {
        Ok(guidelines.to_string())
    } else {
        Ok(format!("{} (Ruleset)", guidelines))
    }
}

fn playlist_description(applied: &[Ruleset], guidelines: &str) -> String {
    if !applied.is_empty() {
        let names: Vec<&str> = applied.iter().map(|r| r.name.as_str()).collect();
        format!("Generated from rulesets: {}", names.join(", "))
    } else if !guidelines.trim().is_empty() {
        format!("Generated from guidelines: {}", guidelines.trim())
    } else {
        "Generated playlist".to_string()
    }
}
