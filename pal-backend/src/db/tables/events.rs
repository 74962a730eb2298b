//! Local event database operations

use chrono::{DateTime, Utc};
use rusqlite::{Result as SqliteResult, Row};

use super::super::{parse_timestamp, Database};
use crate::models::{LocalEvent, NewLocalEvent};

/// UTC epoch millis of an RFC 3339 start, so mixed offsets sort by instant
fn start_sort_key(start: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(start)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).timestamp_millis())
}

impl Database {
    fn row_to_local_event(row: &Row) -> SqliteResult<LocalEvent> {
        let created_at_str: String = row.get(6)?;
        Ok(LocalEvent {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            start: row.get(3)?,
            end: row.get(4)?,
            timezone: row.get(5)?,
            created_at: parse_timestamp(6, &created_at_str)?,
        })
    }

    /// Store a local event; absent optional fields become empty strings
    pub fn create_local_event(&self, event: &NewLocalEvent) -> SqliteResult<LocalEvent> {
        let conn = self.conn();
        let now = Utc::now();

        let description = event.description.clone().unwrap_or_default();
        let end = event.end.clone().unwrap_or_default();
        let timezone = event.timezone.clone().unwrap_or_default();

        conn.execute(
            "INSERT INTO events (title, description, start_at, start_ms, end_at, timezone, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                &event.title,
                &description,
                &event.start,
                start_sort_key(&event.start),
                &end,
                &timezone,
                now.to_rfc3339(),
            ],
        )?;

        Ok(LocalEvent {
            id: conn.last_insert_rowid(),
            title: event.title.clone(),
            description,
            start: event.start.clone(),
            end,
            timezone,
            created_at: now,
        })
    }

    /// List local events ordered by start instant; unparseable starts sort last by raw text
    pub fn list_local_events(&self) -> SqliteResult<Vec<LocalEvent>> {
        let conn = self.conn();

        let mut stmt = conn.prepare(
            "SELECT id, title, description, start_at, end_at, timezone, created_at
             FROM events ORDER BY start_ms IS NULL, start_ms ASC, start_at ASC, id ASC",
        )?;

        let events = stmt
            .query_map([], |row| Self::row_to_local_event(row))?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_event(title: &str, start: &str) -> NewLocalEvent {
        NewLocalEvent {
            title: title.to_string(),
            start: start.to_string(),
            ..NewLocalEvent::default()
        }
    }

    #[test]
    fn test_events_ordered_by_start() {
        let db = Database::new(":memory:").unwrap();
        db.create_local_event(&new_event("Lunch", "2024-01-01T12:00:00Z")).unwrap();
        db.create_local_event(&new_event("Standup", "2024-01-01T09:00:00Z")).unwrap();
        db.create_local_event(&new_event("Retro", "2024-01-02T16:00:00Z")).unwrap();

        let titles: Vec<String> = db
            .list_local_events()
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Standup", "Lunch", "Retro"]);
    }

    #[test]
    fn test_events_with_mixed_offsets_ordered_by_instant() {
        let db = Database::new(":memory:").unwrap();
        db.create_local_event(&new_event("Nine", "2024-01-01T09:00:00Z")).unwrap();
        db.create_local_event(&new_event("Eight", "2024-01-01T10:00:00+02:00")).unwrap();
        db.create_local_event(&new_event("Someday", "next week")).unwrap();

        let titles: Vec<String> = db
            .list_local_events()
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Eight", "Nine", "Someday"]);
    }

    #[test]
    fn test_start_sort_key_normalises_offset() {
        assert_eq!(
            start_sort_key("2024-01-01T10:00:00+02:00"),
            start_sort_key("2024-01-01T08:00:00Z")
        );
        assert_eq!(start_sort_key("tomorrow"), None);
    }

    #[test]
    fn test_missing_optional_fields_stored_empty() {
        let db = Database::new(":memory:").unwrap();
        let event = db
            .create_local_event(&new_event("Standup", "2024-01-01T09:00:00Z"))
            .unwrap();
        assert_eq!(event.end, "");
        assert_eq!(event.description, "");
        assert_eq!(event.timezone, "");

        let stored = &db.list_local_events().unwrap()[0];
        assert_eq!(stored.id, event.id);
        assert_eq!(stored.end, "");
    }
}
