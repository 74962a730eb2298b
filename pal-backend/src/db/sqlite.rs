//! SQLite database - schema definitions and connection management
//!
//! This file contains:
//! - Database struct definition
//! - Connection management (new, conn)
//! - Schema creation
//!
//! All table operations are in the tables/ subdirectory.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Fixed row id of the singleton Google credential
pub(crate) const CREDENTIAL_ROW_ID: i64 = 1;

/// Main database wrapper; a single connection guarded by a Mutex
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database file and initialize schema
    pub fn new(database_url: &str) -> SqliteResult<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    log::warn!("Failed to create database directory {:?}: {}", parent, e);
                }
            }
        }

        let conn = Connection::open(database_url)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init()?;
        Ok(db)
    }

    /// Lock the connection. A poisoned lock is recovered since every
    /// operation is a single statement and leaves no partial state behind.
    pub(crate) fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create all tables and seed the credential row
    fn init(&self) -> SqliteResult<()> {
        let conn = self.conn();

        // Google OAuth credential (exactly one row, id = 1)
        conn.execute(
            "CREATE TABLE IF NOT EXISTS google_tokens (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                access_token TEXT,
                refresh_token TEXT,
                scope TEXT,
                token_type TEXT,
                expiry_date INTEGER,
                updated_at TEXT
            )",
            [],
        )?;

        conn.execute(
            "INSERT OR IGNORE INTO google_tokens (id, updated_at) VALUES (?1, ?2)",
            rusqlite::params![CREDENTIAL_ROW_ID, Utc::now().to_rfc3339()],
        )?;

        // Memories table - append-only key/value facts
        conn.execute(
            "CREATE TABLE IF NOT EXISTS memories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        // Local events table - not linked to remote calendar events
        conn.execute(
            "CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                start_at TEXT NOT NULL,
                start_ms INTEGER,
                end_at TEXT NOT NULL DEFAULT '',
                timezone TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        // Migration: Add start_ms sort key if it doesn't exist (for old DBs)
        let has_start_ms: bool = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('events') WHERE name='start_ms'",
                [],
                |row| row.get::<_, i64>(0),
            )
            .map(|c| c > 0)
            .unwrap_or(false);

        if !has_start_ms {
            conn.execute("ALTER TABLE events ADD COLUMN start_ms INTEGER", [])?;
            conn.execute(
                "UPDATE events SET start_ms = CAST(ROUND((julianday(start_at) - 2440587.5) * 86400000) AS INTEGER)
                 WHERE julianday(start_at) IS NOT NULL",
                [],
            )?;
        }

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_events_start ON events(start_ms, start_at)",
            [],
        )?;

        // Chat transcript
        conn.execute(
            "CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }
}

/// Parse an RFC 3339 column into a UTC timestamp
pub(crate) fn parse_timestamp(idx: usize, value: &str) -> SqliteResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
