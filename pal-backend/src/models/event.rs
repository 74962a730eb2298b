use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Calendar-like event stored locally. Never synced automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalEvent {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub start: String,
    pub end: String,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new local event; optional fields are stored as empty strings
#[derive(Debug, Clone, Default)]
pub struct NewLocalEvent {
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub description: Option<String>,
    pub timezone: Option<String>,
}
