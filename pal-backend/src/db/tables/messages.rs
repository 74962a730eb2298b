//! Chat transcript database operations

use chrono::Utc;
use rusqlite::{Result as SqliteResult, Row};

use super::super::{parse_timestamp, Database};
use crate::models::{Message, MessageRole};

impl Database {
    fn row_to_message(row: &Row) -> SqliteResult<Message> {
        let role_str: String = row.get(1)?;
        let created_at_str: String = row.get(3)?;
        // Unknown roles are read back as user turns rather than failing the whole transcript
        let role = MessageRole::from_str(&role_str).unwrap_or(MessageRole::User);

        Ok(Message {
            id: row.get(0)?,
            role,
            content: row.get(2)?,
            created_at: parse_timestamp(3, &created_at_str)?,
        })
    }

    /// Append a message to the transcript
    pub fn add_message(&self, role: MessageRole, content: &str) -> SqliteResult<Message> {
        let conn = self.conn();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO messages (role, content, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![role.as_str(), content, now.to_rfc3339()],
        )?;

        Ok(Message {
            id: conn.last_insert_rowid(),
            role,
            content: content.to_string(),
            created_at: now,
        })
    }

    /// Most recent `limit` messages, returned in chronological order
    pub fn recent_messages(&self, limit: usize) -> SqliteResult<Vec<Message>> {
        let conn = self.conn();

        let mut stmt = conn.prepare(
            "SELECT id, role, content, created_at FROM messages ORDER BY id DESC LIMIT ?1",
        )?;

        let mut messages = stmt
            .query_map([limit as i64], |row| Self::row_to_message(row))?
            .collect::<SqliteResult<Vec<_>>>()?;
        messages.reverse();

        Ok(messages)
    }
}
