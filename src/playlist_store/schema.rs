//! Schema definition for playlist record tables.

/// Schema definition for playlist record tables.
pub struct PlaylistSchema {
    pub version: usize,
    pub up: &'static str,
}

pub const PLAYLIST_VERSIONED_SCHEMAS: &[PlaylistSchema] = &[PlaylistSchema {
    version: 1,
    up: r#"
            CREATE TABLE IF NOT EXISTS playlists (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                playlist_id TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                guidelines TEXT,
                rulesets_applied TEXT NOT NULL,
                run_id TEXT,
                created_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_playlists_name ON playlists(name);
        "#,
}];
