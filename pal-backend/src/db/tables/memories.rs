//! Memory database operations

use chrono::Utc;
use rusqlite::{Result as SqliteResult, Row};

use super::super::{parse_timestamp, Database};
use crate::models::Memory;

impl Database {
    fn row_to_memory(row: &Row) -> SqliteResult<Memory> {
        let created_at_str: String = row.get(3)?;
        Ok(Memory {
            id: row.get(0)?,
            key: row.get(1)?,
            value: row.get(2)?,
            created_at: parse_timestamp(3, &created_at_str)?,
        })
    }

    /// Append a memory
    pub fn create_memory(&self, key: &str, value: &str) -> SqliteResult<Memory> {
        let conn = self.conn();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO memories (key, value, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, value, now.to_rfc3339()],
        )?;

        Ok(Memory {
            id: conn.last_insert_rowid(),
            key: key.to_string(),
            value: value.to_string(),
            created_at: now,
        })
    }

    /// List memories, most recent first
    pub fn list_memories(&self, limit: Option<usize>) -> SqliteResult<Vec<Memory>> {
        let conn = self.conn();
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let mut stmt = conn.prepare(
            "SELECT id, key, value, created_at FROM memories ORDER BY id DESC LIMIT ?1",
        )?;

        let memories = stmt
            .query_map([limit], |row| Self::row_to_memory(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(memories)
    }
}
