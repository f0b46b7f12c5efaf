//! Schema definition for ruleset tables.

/// Schema definition for ruleset tables.
pub struct RulesetSchema {
    pub version: usize,
    pub up: &'static str,
}

pub const RULESET_VERSIONED_SCHEMAS: &[RulesetSchema] = &[RulesetSchema {
    version: 1,
    up: r#"
            CREATE TABLE IF NOT EXISTS rulesets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                keywords TEXT NOT NULL,
                description TEXT,
                criteria TEXT NOT NULL,
                source_playlist_names TEXT NOT NULL,
                source_mode TEXT NOT NULL,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_rulesets_name ON rulesets(name);
        "#,
}];
