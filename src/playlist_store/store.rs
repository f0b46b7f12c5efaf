//! Playlist record persistence.

use super::models::{NewPlaylistRecord, PlaylistRecord};
use super::schema::PLAYLIST_VERSIONED_SCHEMAS;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

pub trait PlaylistRecordStore: Send + Sync {
    /// Records a created playlist and returns it with its assigned row id.
    fn insert(&self, record: NewPlaylistRecord) -> Result<PlaylistRecord>;

    /// Returns the record for the given catalog playlist id.
    /// Returns Ok(None) if it does not exist.
    fn get_by_playlist_id(&self, playlist_id: &str) -> Result<Option<PlaylistRecord>>;

    /// Returns all records, newest first.
    fn list(&self) -> Result<Vec<PlaylistRecord>>;

    /// Deletes the record for the given catalog playlist id.
    /// Returns whether a record was deleted.
    fn delete_by_playlist_id(&self, playlist_id: &str) -> Result<bool>;
}

/// SQLite-backed [`PlaylistRecordStore`].
#[derive(Clone)]
pub struct SqlitePlaylistStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePlaylistStore {
    /// Create a new store with the given database connection.
    ///
    /// This will initialize the schema if the tables don't exist.
    pub fn new(conn: Arc<Mutex<Connection>>) -> Result<Self> {
        {
            let conn = conn.lock().unwrap();
            let schema = PLAYLIST_VERSIONED_SCHEMAS.first().unwrap();
            conn.execute_batch(schema.up)
                .context("Failed to initialize playlist schema")?;
        }

        Ok(Self { conn })
    }

    /// Open (or create) the database file at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open playlist database at {}", path.display()))?;
        Self::new(Arc::new(Mutex::new(conn)))
    }
}

fn now_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn row_to_record(row: &Row) -> rusqlite::Result<PlaylistRecord> {
    let rulesets_json: String = row.get(4)?;

    Ok(PlaylistRecord {
        id: row.get(0)?,
        playlist_id: row.get(1)?,
        name: row.get(2)?,
        guidelines: row.get(3)?,
        rulesets_applied: serde_json::from_str(&rulesets_json).unwrap_or_default(),
        run_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const RECORD_COLUMNS: &str =
    "id, playlist_id, name, guidelines, rulesets_applied, run_id, created_at";

impl PlaylistRecordStore for SqlitePlaylistStore {
    fn insert(&self, record: NewPlaylistRecord) -> Result<PlaylistRecord> {
        let now = now_timestamp();
        let rulesets_json = serde_json::to_string(&record.rulesets_applied)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO playlists (playlist_id, name, guidelines, rulesets_applied,
                                    run_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.playlist_id,
                record.name,
                record.guidelines,
                rulesets_json,
                record.run_id,
                now
            ],
        )?;
        let id = conn.last_insert_rowid();

        Ok(PlaylistRecord {
            id,
            playlist_id: record.playlist_id,
            name: record.name,
            guidelines: record.guidelines,
            rulesets_applied: record.rulesets_applied,
            run_id: record.run_id,
            created_at: now,
        })
    }

    fn get_by_playlist_id(&self, playlist_id: &str) -> Result<Option<PlaylistRecord>> {
        let conn = self.conn.lock().unwrap();
        match conn.query_row(
            &format!(
                "SELECT {} FROM playlists WHERE playlist_id = ?1",
                RECORD_COLUMNS
            ),
            params![playlist_id],
            row_to_record,
        ) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> Result<Vec<PlaylistRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM playlists ORDER BY created_at DESC, id DESC",
            RECORD_COLUMNS
        ))?;

        let records = stmt
            .query_map([], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn delete_by_playlist_id(&self, playlist_id: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM playlists WHERE playlist_id = ?1",
            params![playlist_id],
        )?;
        Ok(deleted > 0)
    }
}
