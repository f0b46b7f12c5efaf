//! Follower-count tiers and per-artist sampling quotas.

/// Follower-count band of an artist.
///
/// Bands partition the follower axis with no gaps; each band except the top
/// one caps how large a share of a playlist a single artist may fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArtistTier {
    /// Up to 50 000 followers.
    Micro,
    /// Up to 500 000 followers.
    Small,
    /// Up to 1 000 000 followers.
    Medium,
    /// Up to 5 000 000 followers.
    Large,
    /// Up to 8 000 000 followers.
    Major,
    /// Above 8 000 000 followers; uncapped.
    Mega,
}

impl ArtistTier {
    /// Assign the lowest tier whose upper bound covers the follower count.
    ///
    /// Unknown follower counts should be passed as 0, which lands in the
    /// lowest tier.
    pub fn classify(followers: u64) -> Self {
        match followers {
            0..=50_000 => ArtistTier::Micro,
            50_001..=500_000 => ArtistTier::Small,
            500_001..=1_000_000 => ArtistTier::Medium,
            1_000_001..=5_000_000 => ArtistTier::Large,
            5_000_001..=8_000_000 => ArtistTier::Major,
            _ => ArtistTier::Mega,
        }
    }

    /// Sampling percentage for the tier; `None` means uncapped.
    pub fn percent(&self) -> Option<usize> {
        match self {
            ArtistTier::Micro => Some(2),
            ArtistTier::Small => Some(5),
            ArtistTier::Medium => Some(10),
            ArtistTier::Large => Some(15),
            ArtistTier::Major => Some(20),
            ArtistTier::Mega => None,
        }
    }

    /// Per-artist track cap for a request of `requested` songs.
    ///
    /// Capped tiers round up, so every artist may contribute at least one
    /// track. Quotas are independent per artist and may sum past the
    /// requested count; the sampler still stops at the target.
    pub fn quota(&self, requested: usize) -> usize {
        match self.percent() {
            Some(percent) => (requested * percent).div_ceil(100),
            None => requested,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtistTier::Micro => "micro",
            ArtistTier::Small => "small",
            ArtistTier::Medium => "medium",
            ArtistTier::Large => "large",
            ArtistTier::Major => "major",
            ArtistTier::Mega => "mega",
        }
    }
}

/// Quota for an artist with the given follower count.
pub fn quota_for(followers: u64, requested: usize) -> usize {
    ArtistTier::classify(followers).quota(requested)
}
