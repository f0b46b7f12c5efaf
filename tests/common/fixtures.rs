//! Fixture builders for end-to-end tests.

use playlist_curator::catalog::{Artist, ArtistRef, CatalogItem, ItemKind};
use playlist_curator::clock::FixedClock;
use playlist_curator::curation::{DailyDrivePolicy, GenerationRequest, PlaylistGenerator};
use playlist_curator::playlist_store::SqlitePlaylistStore;
use playlist_curator::ruleset::SqliteRulesetStore;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rusqlite::Connection;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::fake_catalog::FakeCatalogClient;

/// Monday morning, pinned so daily-drive names are stable.
pub const MONDAY_MORNING: &str = "2024-01-15T08:30:00+00:00";

pub fn rng() -> SmallRng {
    SmallRng::seed_from_u64(42)
}

pub fn artist(id: &str, name: &str) -> Artist {
    Artist {
        id: id.to_string(),
        name: name.to_string(),
        genres: vec![],
    }
}

pub fn track(id: &str, name: &str, artist_name: &str) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        kind: ItemKind::Track,
        name: name.to_string(),
        artists: vec![ArtistRef {
            name: artist_name.to_string(),
            genres: vec![],
        }],
        release_date: Some("2020-06-01".to_string()),
        explicit: false,
        show_name: None,
    }
}

pub fn track_from_year(id: &str, name: &str, artist_name: &str, year: i32) -> CatalogItem {
    CatalogItem {
        release_date: Some(format!("{}-06-01", year)),
        ..track(id, name, artist_name)
    }
}

pub fn episode(id: &str, name: &str, show: &str) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        kind: ItemKind::Episode,
        name: name.to_string(),
        artists: vec![],
        release_date: Some("2024-01-10".to_string()),
        explicit: false,
        show_name: Some(show.to_string()),
    }
}

/// `count` tracks with ids `{prefix}-1` through `{prefix}-{count}`.
pub fn numbered_tracks(prefix: &str, artist_name: &str, count: usize) -> Vec<CatalogItem> {
    (1..=count)
        .map(|n| {
            track(
                &format!("{}-{}", prefix, n),
                &format!("Song {}", n),
                artist_name,
            )
        })
        .collect()
}

/// Request with defaults, carrying only guidelines.
pub fn request(guidelines: &str) -> GenerationRequest {
    GenerationRequest {
        guidelines: guidelines.to_string(),
        ..Default::default()
    }
}

/// Everything one generation test needs, wired against in-memory stores and
/// a clock pinned to [`MONDAY_MORNING`].
pub struct TestEnv {
    pub client: Arc<FakeCatalogClient>,
    pub rulesets: Arc<SqliteRulesetStore>,
    pub records: Arc<SqlitePlaylistStore>,
    pub generator: PlaylistGenerator,
}

pub fn test_env(client: FakeCatalogClient) -> TestEnv {
    test_env_with_intros(client, HashMap::new())
}

pub fn test_env_with_intros(client: FakeCatalogClient, intros: HashMap<String, String>) -> TestEnv {
    let client = Arc::new(client);
    let rulesets = Arc::new(
        SqliteRulesetStore::new(Arc::new(Mutex::new(Connection::open_in_memory().unwrap())))
            .unwrap(),
    );
    let records = Arc::new(
        SqlitePlaylistStore::new(Arc::new(Mutex::new(Connection::open_in_memory().unwrap())))
            .unwrap(),
    );
    let generator = PlaylistGenerator::new(
        client.clone(),
        rulesets.clone(),
        records.clone(),
        Arc::new(FixedClock::from_rfc3339(MONDAY_MORNING)),
        DailyDrivePolicy::new(intros),
    );
    TestEnv {
        client,
        rulesets,
        records,
        generator,
    }
}
