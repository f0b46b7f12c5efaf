//! Ruleset persistence.

use super::models::{NewRuleset, Ruleset, RulesetCriteria, RulesetUpdate, SourceMode};
use super::schema::RULESET_VERSIONED_SCHEMAS;
use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

lazy_static! {
    /// Rulesets installed into an empty store.
    static ref DEFAULT_RULESETS: Vec<NewRuleset> = vec![
        NewRuleset {
            name: "throwback".to_string(),
            keywords: vec![
                "throwback".to_string(),
                "retro".to_string(),
                "oldies".to_string(),
                "classic".to_string(),
                "nostalgic".to_string(),
            ],
            description: Some("Songs from before 2010 - perfect for nostalgic vibes".to_string()),
            criteria: RulesetCriteria {
                max_year: Some(2010),
                ..Default::default()
            },
            source_playlist_names: vec![],
            source_mode: SourceMode::Supplement,
            is_active: true,
        },
        NewRuleset {
            name: "fresh".to_string(),
            keywords: vec![
                "fresh".to_string(),
                "new".to_string(),
                "recent".to_string(),
                "latest".to_string(),
                "current".to_string(),
            ],
            description: Some("Recent songs from the last 5 years".to_string()),
            criteria: RulesetCriteria {
                years_back: Some(5),
                ..Default::default()
            },
            source_playlist_names: vec![],
            source_mode: SourceMode::Supplement,
            is_active: true,
        },
        NewRuleset {
            name: "covers".to_string(),
            keywords: vec![
                "covers".to_string(),
                "cover songs".to_string(),
                "tacno".to_string(),
            ],
            description: Some("Songs from the Covers playlist".to_string()),
            criteria: RulesetCriteria::default(),
            source_playlist_names: vec!["Covers".to_string()],
            source_mode: SourceMode::Replace,
            is_active: true,
        },
    ];
}

pub trait RulesetStore: Send + Sync {
    /// Returns all rulesets ordered by name.
    fn list(&self) -> Result<Vec<Ruleset>>;

    /// Returns the ruleset with the given id.
    /// Returns Ok(None) if it does not exist.
    fn get_by_id(&self, id: i64) -> Result<Option<Ruleset>>;

    /// Returns the ruleset with the given name.
    /// Returns Ok(None) if it does not exist.
    fn get_by_name(&self, name: &str) -> Result<Option<Ruleset>>;

    /// Creates a new ruleset and returns it with its assigned id.
    /// Returns Err if a ruleset with the same name already exists.
    fn create(&self, new: NewRuleset) -> Result<Ruleset>;

    /// Applies a partial update and returns the updated ruleset.
    /// Returns Ok(None) if the ruleset does not exist.
    /// Returns Err if a rename collides with another ruleset's name.
    fn update(&self, id: i64, update: RulesetUpdate) -> Result<Option<Ruleset>>;

    /// Deletes the ruleset with the given id.
    /// Returns whether a ruleset was deleted.
    fn delete(&self, id: i64) -> Result<bool>;

    /// Installs the default rulesets if the store holds none.
    /// Returns the number of rulesets inserted.
    fn seed_defaults(&self) -> Result<usize>;
}

/// SQLite-backed [`RulesetStore`].
#[derive(Clone)]
pub struct SqliteRulesetStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRulesetStore {
    /// Create a new store with the given database connection.
    ///
    /// This will initialize the schema if the tables don't exist.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Result<Self> {
        {
            let conn = conn.lock().unwrap();
            let schema = RULESET_VERSIONED_SCHEMAS.first().unwrap();
            conn.execute_batch(schema.up)
                .context("Failed to initialize ruleset schema")?;
        }

        Ok(Self { conn })
    }

    /// Open (or create) the database file at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open ruleset database at {}", path.display()))?;
        Self::new(Arc::new(Mutex::new(conn)))
    }
}

fn now_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn row_to_ruleset(row: &Row) -> rusqlite::Result<Ruleset> {
    let keywords_json: String = row.get(2)?;
    let criteria_json: String = row.get(4)?;
    let sources_json: String = row.get(5)?;
    let mode_str: String = row.get(6)?;

    Ok(Ruleset {
        id: row.get(0)?,
        name: row.get(1)?,
        keywords: serde_json::from_str(&keywords_json).unwrap_or_default(),
        description: row.get(3)?,
        criteria: serde_json::from_str(&criteria_json).unwrap_or_default(),
        source_playlist_names: serde_json::from_str(&sources_json).unwrap_or_default(),
        source_mode: SourceMode::from_str(&mode_str).unwrap_or_default(),
        is_active: row.get::<_, i64>(7)? != 0,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

const RULESET_COLUMNS: &str = "id, name, keywords, description, criteria, \
                               source_playlist_names, source_mode, is_active, \
                               created_at, updated_at";

impl RulesetStore for SqliteRulesetStore {
    fn list(&self) -> Result<Vec<Ruleset>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM rulesets ORDER BY name ASC",
            RULESET_COLUMNS
        ))?;

        let rulesets = stmt
            .query_map([], row_to_ruleset)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rulesets)
    }

    fn get_by_id(&self, id: i64) -> Result<Option<Ruleset>> {
        let conn = self.conn.lock().unwrap();
        match conn.query_row(
            &format!("SELECT {} FROM rulesets WHERE id = ?1", RULESET_COLUMNS),
            params![id],
            row_to_ruleset,
        ) {
            Ok(ruleset) => Ok(Some(ruleset)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn get_by_name(&self, name: &str) -> Result<Option<Ruleset>> {
        let conn = self.conn.lock().unwrap();
        match conn.query_row(
            &format!("SELECT {} FROM rulesets WHERE name = ?1", RULESET_COLUMNS),
            params![name],
            row_to_ruleset,
        ) {
            Ok(ruleset) => Ok(Some(ruleset)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn create(&self, new: NewRuleset) -> Result<Ruleset> {
        if self.get_by_name(&new.name)?.is_some() {
            bail!("Ruleset '{}' already exists", new.name);
        }

        let now = now_timestamp();
        let keywords_json = serde_json::to_string(&new.keywords)?;
        let criteria_json = serde_json::to_string(&new.criteria)?;
        let sources_json = serde_json::to_string(&new.source_playlist_names)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO rulesets (name, keywords, description, criteria,
                                   source_playlist_names, source_mode, is_active,
                                   created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                new.name,
                keywords_json,
                new.description,
                criteria_json,
                sources_json,
                new.source_mode.as_str(),
                new.is_active as i64,
                now,
                now
            ],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Ruleset {
            id,
            name: new.name,
            keywords: new.keywords,
            description: new.description,
            criteria: new.criteria,
            source_playlist_names: new.source_playlist_names,
            source_mode: new.source_mode,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        })
    }

    fn update(&self, id: i64, update: RulesetUpdate) -> Result<Option<Ruleset>> {
        let existing = match self.get_by_id(id)? {
            Some(ruleset) => ruleset,
            None => return Ok(None),
        };

        if let Some(new_name) = &update.name {
            if *new_name != existing.name && self.get_by_name(new_name)?.is_some() {
                bail!("Ruleset '{}' already exists", new_name);
            }
        }

        let merged = Ruleset {
            id: existing.id,
            name: update.name.unwrap_or(existing.name),
            keywords: update.keywords.unwrap_or(existing.keywords),
            description: update.description.or(existing.description),
            criteria: update.criteria.unwrap_or(existing.criteria),
            source_playlist_names: update
                .source_playlist_names
                .unwrap_or(existing.source_playlist_names),
            source_mode: update.source_mode.unwrap_or(existing.source_mode),
            is_active: update.is_active.unwrap_or(existing.is_active),
            created_at: existing.created_at,
            updated_at: now_timestamp(),
        };

        let keywords_json = serde_json::to_string(&merged.keywords)?;
        let criteria_json = serde_json::to_string(&merged.criteria)?;
        let sources_json = serde_json::to_string(&merged.source_playlist_names)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE rulesets
             SET name = ?1, keywords = ?2, description = ?3, criteria = ?4,
                 source_playlist_names = ?5, source_mode = ?6, is_active = ?7,
                 updated_at = ?8
             WHERE id = ?9",
            params![
                merged.name,
                keywords_json,
                merged.description,
                criteria_json,
                sources_json,
                merged.source_mode.as_str(),
                merged.is_active as i64,
                merged.updated_at,
                id
            ],
        )?;

        Ok(Some(merged))
    }

    fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM rulesets WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn seed_defaults(&self) -> Result<usize> {
        {
            let conn = self.conn.lock().unwrap();
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM rulesets", [], |row| row.get(0))?;
            if count > 0 {
                return Ok(0);
            }
        }

        let mut inserted = 0;
        for ruleset in DEFAULT_RULESETS.iter() {
            self.create(ruleset.clone())?;
            inserted += 1;
        }

        Ok(inserted)
    }
}
