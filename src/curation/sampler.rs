//! Quota-respecting randomized track selection.

use crate::catalog::{Artist, CatalogItem};
use rand::Rng;

/// Redraw attempts from one artist before an explicit track is accepted.
const EXPLICIT_RETRY_LIMIT: usize = 5;

/// One artist's candidate pool for a sampling run.
#[derive(Debug, Clone)]
pub struct ArtistPool {
    pub artist: Artist,
    pub quota: usize,
    pub tracks: Vec<CatalogItem>,
}

/// Draw tracks until `target` are collected or no eligible artist remains.
///
/// Each draw picks an eligible artist uniformly at random, then one of its
/// remaining tracks uniformly at random, without replacement. An artist stays
/// eligible while it is under quota and its pool is non-empty. When explicit
/// content is disallowed, an explicit draw is redrawn from the same artist up
/// to [`EXPLICIT_RETRY_LIMIT`] times; if every redraw is explicit too, the
/// last one is accepted so a run cannot stall. Rejected draws are consumed.
///
/// Returns the selected track ids in draw order; the result is shorter than
/// `target` when candidates run out, which is not an error.
pub fn sample_tracks<R: Rng>(
    mut pools: Vec<ArtistPool>,
    target: usize,
    allow_explicit: bool,
    rng: &mut R,
) -> Vec<String> {
    let mut selected = vec![0usize; pools.len()];
    let mut result = Vec::new();

    while result.len() < target {
        let eligible: Vec<usize> = pools
            .iter()
            .enumerate()
            .filter(|(i, pool)| selected[*i] < pool.quota && !pool.tracks.is_empty())
            .map(|(i, _)| i)
            .collect();

        if eligible.is_empty() {
            break;
        }

        let pick = eligible[rng.random_range(0..eligible.len())];
        let pool = &mut pools[pick];

        let index = rng.random_range(0..pool.tracks.len());
        let mut track = pool.tracks.swap_remove(index);

        if !allow_explicit && track.explicit {
            for _ in 0..EXPLICIT_RETRY_LIMIT {
                if pool.tracks.is_empty() {
                    break;
                }
                let index = rng.random_range(0..pool.tracks.len());
                track = pool.tracks.swap_remove(index);
                if !track.explicit {
                    break;
                }
            }
        }

        selected[pick] += 1;
        result.push(track.id);
    }

    result
}
