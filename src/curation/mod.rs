mod daily_drive;
mod error;
mod filter;
mod generator;
mod models;
mod sampler;
mod tiers;

pub use daily_drive::{ensure_name_available, weekday_name, DailyDrivePolicy, DAILY_DRIVE_PREFIX};
pub use error::GenerationError;
pub use filter::{dedupe_by_uri, filter_items};
pub use generator::PlaylistGenerator;
pub use models::{GenerationRequest, PlaylistCreated};
pub use sampler::{sample_tracks, ArtistPool};
pub use tiers::{quota_for, ArtistTier};
