//! End-to-end playlist generation tests
//!
//! Runs the full pipeline against the scripted catalog fake with in-memory
//! stores and a clock pinned to Monday, 2024-01-15. Covers daily-drive
//! regeneration, naming conflicts, source-playlist modes, tier quotas and
//! the local record trail.

mod common;

use common::{
    artist, episode, numbered_tracks, request, rng, test_env, test_env_with_intros, track,
    track_from_year, FakeCatalogClient,
};
use playlist_curator::curation::GenerationError;
use playlist_curator::playlist_store::PlaylistRecordStore;
use playlist_curator::ruleset::{NewRuleset, RulesetCriteria, RulesetStore, SourceMode};
use std::collections::HashMap;

fn source_ruleset(name: &str, keyword: &str, playlist: &str, mode: SourceMode) -> NewRuleset {
    NewRuleset {
        name: name.to_string(),
        keywords: vec![keyword.to_string()],
        description: None,
        criteria: RulesetCriteria::default(),
        source_playlist_names: vec![playlist.to_string()],
        source_mode: mode,
        is_active: true,
    }
}

#[tokio::test]
async fn test_daily_drive_regeneration_purges_previous_run() {
    let fake = FakeCatalogClient::new().with_artist(
        artist("a1", "Sundrift"),
        2_000_000,
        numbered_tracks("a1", "Sundrift", 10),
    );
    let env = test_env(fake);

    let mut req = request("");
    req.is_daily_drive = true;

    let first = env.generator.generate(req.clone(), &mut rng()).await.unwrap();
    assert_eq!(first.name, "Daily Drive - Monday");

    let second = env.generator.generate(req, &mut rng()).await.unwrap();
    assert_eq!(second.name, "Daily Drive - Monday");

    // The first run's playlist is gone, remotely and locally.
    assert_eq!(env.client.deleted_ids(), vec![first.playlist_id]);
    let records = env.records.list().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].playlist_id, second.playlist_id);

    assert_eq!(
        env.client.created_names(),
        vec!["Daily Drive - Monday", "Daily Drive - Monday"]
    );
}

#[tokio::test]
async fn test_daily_drive_inserts_weekday_intro_first() {
    let fake = FakeCatalogClient::new().with_artist(
        artist("a1", "Sundrift"),
        10_000_000,
        numbered_tracks("a1", "Sundrift", 5),
    );
    let mut intros = HashMap::new();
    intros.insert(
        "monday".to_string(),
        "spotify:track:intro-mon".to_string(),
    );
    let env = test_env_with_intros(fake, intros);

    let mut req = request("");
    req.is_daily_drive = true;

    let created = env.generator.generate(req, &mut rng()).await.unwrap();

    let uris = env.client.uris_added_to(&created.playlist_id);
    assert_eq!(uris[0], "spotify:track:intro-mon");
    assert_eq!(uris.len(), 6);
    assert_eq!(created.items_count, 6);

    // Items are appended, never positioned.
    assert!(env.client.add_calls().iter().all(|c| c.position.is_none()));
}

#[tokio::test]
async fn test_existing_name_rejects_without_creating() {
    let fake = FakeCatalogClient::new()
        .with_artist(
            artist("a1", "Sundrift"),
            10_000_000,
            numbered_tracks("a1", "Sundrift", 5),
        )
        .with_playlist("p-existing", "Road Trip", vec![]);
    let env = test_env(fake);

    let mut req = request("road trip songs");
    req.name = Some("Road Trip".to_string());

    let err = env.generator.generate(req, &mut rng()).await.unwrap_err();
    assert!(matches!(err, GenerationError::NameConflict(_)));
    assert!(env.client.created_names().is_empty());
    assert!(env.records.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_replace_mode_source_bypasses_sampling() {
    let covers = vec![
        track("c1", "Cover One", "Tacno"),
        track("c2", "Cover Two", "Tacno"),
        track("c3", "Cover Three", "Tacno"),
    ];
    let fake = FakeCatalogClient::new()
        .with_artist(
            artist("a1", "Sundrift"),
            10_000_000,
            numbered_tracks("a1", "Sundrift", 10),
        )
        .with_playlist("p-cov", "Covers", covers.clone());
    let env = test_env(fake);
    env.rulesets.seed_defaults().unwrap();

    let created = env
        .generator
        .generate(request("play the covers"), &mut rng())
        .await
        .unwrap();

    assert_eq!(created.rulesets_applied, vec!["covers"]);
    assert_eq!(created.name, "play the covers (Ruleset)");

    // Source items only, in playlist order; nothing sampled.
    let uris = env.client.uris_added_to(&created.playlist_id);
    let expected: Vec<String> = covers.iter().map(|t| t.uri()).collect();
    assert_eq!(uris, expected);
}

#[tokio::test]
async fn test_supplement_mode_appends_source_items() {
    let fake = FakeCatalogClient::new()
        .with_artist(
            artist("a1", "Sundrift"),
            10_000_000,
            numbered_tracks("a1", "Sundrift", 3),
        )
        .with_playlist("p-extra", "Extras", vec![track("x1", "Deep Cut", "Sundrift")]);
    let env = test_env(fake);
    env.rulesets
        .create(source_ruleset(
            "extras",
            "extras",
            "Extras",
            SourceMode::Supplement,
        ))
        .unwrap();

    let created = env
        .generator
        .generate(request("with extras please"), &mut rng())
        .await
        .unwrap();

    assert_eq!(created.rulesets_applied, vec!["extras"]);
    let uris = env.client.uris_added_to(&created.playlist_id);
    assert_eq!(uris.len(), 4);
    // Sampled tracks first, source material after.
    assert_eq!(uris[3], "spotify:track:x1");
}

#[tokio::test]
async fn test_tier_quota_caps_small_artists() {
    // 10k followers lands in the lowest tier: 2% of 20 rounds up to one
    // track. The 10M artist is uncapped and contributes its whole pool.
    let fake = FakeCatalogClient::new()
        .with_artist(
            artist("small", "Garage Act"),
            10_000,
            numbered_tracks("small", "Garage Act", 10),
        )
        .with_artist(
            artist("big", "Stadium Act"),
            10_000_000,
            numbered_tracks("big", "Stadium Act", 10),
        );
    let env = test_env(fake);

    let created = env
        .generator
        .generate(request("mix it up"), &mut rng())
        .await
        .unwrap();

    let uris = env.client.uris_added_to(&created.playlist_id);
    let from_small = uris
        .iter()
        .filter(|u| u.starts_with("spotify:track:small-"))
        .count();
    assert_eq!(from_small, 1);
    assert_eq!(uris.len(), 11);
}

#[tokio::test]
async fn test_music_only_drops_episodes_from_sources() {
    let mixed = vec![
        track("m1", "Song", "Band"),
        episode("e1", "Morning Show", "The Daily"),
    ];
    let fake = FakeCatalogClient::new().with_playlist("p-mix", "Mixed", mixed);
    let env = test_env(fake);
    env.rulesets
        .create(source_ruleset(
            "mixed",
            "mixed",
            "Mixed",
            SourceMode::Replace,
        ))
        .unwrap();

    let mut req = request("play mixed bag");
    req.music_only = true;

    let created = env.generator.generate(req, &mut rng()).await.unwrap();

    let uris = env.client.uris_added_to(&created.playlist_id);
    assert_eq!(uris, vec!["spotify:track:m1".to_string()]);
}

#[tokio::test]
async fn test_missing_source_playlist_fails_the_run() {
    let fake = FakeCatalogClient::new().with_artist(
        artist("a1", "Sundrift"),
        10_000_000,
        numbered_tracks("a1", "Sundrift", 5),
    );
    let env = test_env(fake);
    env.rulesets.seed_defaults().unwrap();

    // The seeded covers ruleset names a playlist the fake does not have.
    let err = env
        .generator
        .generate(request("tacno covers"), &mut rng())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::SourcePlaylistNotFound(_)));
    assert!(env.client.created_names().is_empty());
}

#[tokio::test]
async fn test_no_candidates_is_an_empty_result_error() {
    let env = test_env(FakeCatalogClient::new());

    let err = env
        .generator
        .generate(request("anything at all"), &mut rng())
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::EmptyResult));
    assert!(env.client.created_names().is_empty());
}

#[tokio::test]
async fn test_throwback_ruleset_filters_recent_tracks() {
    let tracks = vec![
        track_from_year("old1", "Classic Hit", "Veterans", 2005),
        track_from_year("old2", "Another Classic", "Veterans", 2009),
        track_from_year("new1", "Modern Single", "Veterans", 2019),
    ];
    let fake = FakeCatalogClient::new().with_artist(artist("vet", "Veterans"), 10_000_000, tracks);
    let env = test_env(fake);
    env.rulesets.seed_defaults().unwrap();

    let created = env
        .generator
        .generate(request("some throwback tunes"), &mut rng())
        .await
        .unwrap();

    assert_eq!(created.rulesets_applied, vec!["throwback"]);
    assert_eq!(created.name, "some throwback tunes (Ruleset)");

    let uris = env.client.uris_added_to(&created.playlist_id);
    assert_eq!(uris.len(), 2);
    assert!(uris.iter().all(|u| u.starts_with("spotify:track:old")));
}

#[tokio::test]
async fn test_duplicate_uris_collapse_across_sampling_and_sources() {
    // The source playlist repeats a track the sampler will also pick.
    let fake = FakeCatalogClient::new()
        .with_artist(
            artist("a1", "Sundrift"),
            10_000_000,
            numbered_tracks("a1", "Sundrift", 3),
        )
        .with_playlist(
            "p-d",
            "Dupes",
            vec![
                track("a1-1", "Song 1", "Sundrift"),
                track("y1", "Fresh Find", "Other"),
            ],
        );
    let env = test_env(fake);
    env.rulesets
        .create(source_ruleset(
            "dupes",
            "dupes",
            "Dupes",
            SourceMode::Supplement,
        ))
        .unwrap();

    let created = env
        .generator
        .generate(request("with dupes"), &mut rng())
        .await
        .unwrap();

    let uris = env.client.uris_added_to(&created.playlist_id);
    assert_eq!(uris.len(), 4);
    assert_eq!(
        uris.iter()
            .filter(|u| *u == "spotify:track:a1-1")
            .count(),
        1
    );
    assert!(uris.contains(&"spotify:track:y1".to_string()));
}

#[tokio::test]
async fn test_result_truncated_to_requested_size() {
    let fake = FakeCatalogClient::new().with_artist(
        artist("a1", "Sundrift"),
        10_000_000,
        numbered_tracks("a1", "Sundrift", 10),
    );
    let env = test_env(fake);

    let mut req = request("just a couple");
    req.num_songs = 2;

    let created = env.generator.generate(req, &mut rng()).await.unwrap();
    assert_eq!(created.items_count, 2);
    assert_eq!(env.client.uris_added_to(&created.playlist_id).len(), 2);
}

#[tokio::test]
async fn test_large_runs_add_items_in_chunks() {
    let fake = FakeCatalogClient::new().with_artist(
        artist("a1", "Sundrift"),
        10_000_000,
        numbered_tracks("a1", "Sundrift", 150),
    );
    let env = test_env(fake);

    let mut req = request("the lot");
    req.num_songs = 150;

    let created = env.generator.generate(req, &mut rng()).await.unwrap();
    assert_eq!(created.items_count, 150);

    let calls = env.client.add_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].uris.len(), 100);
    assert_eq!(calls[1].uris.len(), 50);
    assert!(calls.iter().all(|c| c.position.is_none()));
}

#[tokio::test]
async fn test_generation_is_recorded_locally() {
    let fake = FakeCatalogClient::new().with_artist(
        artist("a1", "Sundrift"),
        10_000_000,
        numbered_tracks("a1", "Sundrift", 5),
    );
    let env = test_env(fake);

    let created = env
        .generator
        .generate(request("evening chill"), &mut rng())
        .await
        .unwrap();
    assert_eq!(created.name, "evening chill");

    let record = env
        .records
        .get_by_playlist_id(&created.playlist_id)
        .unwrap()
        .unwrap();
    assert_eq!(record.name, "evening chill");
    assert_eq!(record.guidelines.as_deref(), Some("evening chill"));
    assert!(record.rulesets_applied.is_empty());
    assert!(record.run_id.is_some());
}
