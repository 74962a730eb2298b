use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user-supplied fact used to personalize chat replies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub id: i64,
    pub key: String,
    pub value: String,
    pub created_at: DateTime<Utc>,
}
