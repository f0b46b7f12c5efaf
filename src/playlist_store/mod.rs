mod models;
mod schema;
mod store;

pub use models::{NewPlaylistRecord, PlaylistRecord};
pub use store::{PlaylistRecordStore, SqlitePlaylistStore};
