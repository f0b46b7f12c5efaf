//! Common test infrastructure
//!
//! Provides the scripted catalog fake and the fixture builders the
//! end-to-end suites are built on.

mod fake_catalog;
mod fixtures;

#[allow(unused_imports)]
pub use fake_catalog::{AddCall, FakeCatalogClient};
#[allow(unused_imports)]
pub use fixtures::{
    artist, episode, numbered_tracks, request, rng, test_env, test_env_with_intros, track,
    track_from_year, TestEnv, MONDAY_MORNING,
};
